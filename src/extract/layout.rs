// src/extract/layout.rs
use std::ops::Range;

/// Every series covers one day-of-month slot per entry.
pub const DAYS_PER_MONTH: usize = 31;

/// Keyword test applied to a whole row, joined with spaces and lowercased.
#[derive(Debug, Clone)]
pub struct MarkerRule {
    pub needles: &'static [&'static str],
    /// When true every needle must appear; otherwise any one is enough.
    pub match_all: bool,
}

impl MarkerRule {
    pub fn matches(&self, row_text: &str) -> bool {
        if self.match_all {
            self.needles.iter().all(|n| row_text.contains(n))
        } else {
            self.needles.iter().any(|n| row_text.contains(n))
        }
    }
}

/// How a series locates its source row in the sheet.
#[derive(Debug, Clone)]
pub enum RowSelector {
    /// Read a hardcoded row index, but only when the row has at least
    /// `min_cols` columns.
    Fixed { index: usize, min_cols: usize },
    /// Scan every row for marker keywords; the last matching row wins.
    LastMarker(MarkerRule),
}

/// Cell-to-float coercion applied during windowed extraction.
#[derive(Debug, Clone, Copy)]
pub enum ValueTransform {
    /// Strip stray quotes and convert a comma decimal separator to a dot.
    DecimalComma,
    /// As above, plus percent signs.
    DecimalCommaPercent,
}

impl ValueTransform {
    /// Coerce one raw cell to a float. Missing or unparseable cells become 0.
    pub fn coerce(self, cell: &str) -> f64 {
        let mut s = cell.replace('"', "").replace(',', ".");
        if let Self::DecimalCommaPercent = self {
            s = s.replace('%', "");
        }
        s.trim().parse::<f64>().unwrap_or(0.0)
    }
}

/// Where one series' numbers live in the sheet.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub selector: RowSelector,
    pub columns: Range<usize>,
    pub transform: ValueTransform,
    /// Fill used for all 31 days when the source row is missing or empty.
    pub empty_fill: f64,
}

/// Full sheet-to-series mapping. Layout assumptions are data, not code: an
/// export with a different shape only needs a different `Layout` value.
#[derive(Debug, Clone)]
pub struct Layout {
    pub productivity: SeriesSpec,
    /// Marker discovery for the productivity group. Extraction reads the
    /// fixed row regardless; the marker is only discovered and logged so
    /// sheet drift shows up in the logs.
    pub productivity_marker: MarkerRule,
    pub availability: SeriesSpec,
    pub straightpass: SeriesSpec,
    pub downtime: SeriesSpec,
}

impl Default for Layout {
    /// The "Data Dashboard Exhaust" tab: productivity on a fixed row with
    /// days starting at column 20, the other series on keyword-marked rows
    /// with days from column 0.
    fn default() -> Self {
        Self {
            productivity: SeriesSpec {
                selector: RowSelector::Fixed {
                    index: 3,
                    min_cols: 21,
                },
                columns: 20..51,
                transform: ValueTransform::DecimalComma,
                empty_fill: 0.0,
            },
            productivity_marker: MarkerRule {
                needles: &["mass prod.earned h", "daily"],
                match_all: true,
            },
            availability: SeriesSpec {
                selector: RowSelector::LastMarker(MarkerRule {
                    needles: &["availability", "daily"],
                    match_all: true,
                }),
                columns: 0..31,
                transform: ValueTransform::DecimalCommaPercent,
                empty_fill: 95.0,
            },
            straightpass: SeriesSpec {
                selector: RowSelector::LastMarker(MarkerRule {
                    needles: &["straight pass", "straightpass"],
                    match_all: false,
                }),
                columns: 0..31,
                transform: ValueTransform::DecimalCommaPercent,
                empty_fill: 94.0,
            },
            downtime: SeriesSpec {
                selector: RowSelector::LastMarker(MarkerRule {
                    needles: &["downtime", "daily"],
                    match_all: true,
                }),
                columns: 0..31,
                transform: ValueTransform::DecimalComma,
                empty_fill: 0.0,
            },
        }
    }
}
