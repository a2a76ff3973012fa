// src/extract/mod.rs
use anyhow::{ensure, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::table::Table;

pub mod defaults;
pub mod layout;

use layout::{Layout, MarkerRule, RowSelector, SeriesSpec, DAYS_PER_MONTH};

/// Availability target drawn as a reference line on the dashboard.
pub const AVAILABILITY_TARGET: f64 = 90.0;
/// Straight-pass target drawn as a reference line on the dashboard.
pub const STRAIGHTPASS_TARGET: f64 = 95.0;

/// The structured output record: all four metric groups, 31 days each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiBundle {
    pub productivity: Productivity,
    pub availability: Availability,
    pub straightpass: StraightPass,
    pub downtime: Downtime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Productivity {
    pub daily: Vec<f64>,
    /// Running average of the non-zero daily values.
    pub accumulation: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub daily: Vec<f64>,
    pub target: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StraightPass {
    pub qty: Vec<f64>,
    pub percentage: Vec<f64>,
    pub target: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Downtime {
    pub daily: Vec<f64>,
}

/// Extract the KPI bundle from a parsed table using the default sheet layout.
///
/// Total: an absent or empty table, and any internal failure, yield the rich
/// default bundle instead of an error.
pub fn extract_kpi_bundle(table: Option<&Table>) -> KpiBundle {
    extract_with_layout(table, &Layout::default())
}

/// Layout-injectable variant of [`extract_kpi_bundle`].
pub fn extract_with_layout(table: Option<&Table>, layout: &Layout) -> KpiBundle {
    let table = match table {
        Some(t) if !t.is_empty() => t,
        _ => {
            debug!("no table rows, substituting rich default bundle");
            return defaults::RICH_DEFAULT.clone();
        }
    };

    match try_extract(table, layout) {
        Ok(bundle) => bundle,
        Err(err) => {
            warn!(%err, "extraction failed, substituting rich default bundle");
            defaults::RICH_DEFAULT.clone()
        }
    }
}

fn try_extract(table: &Table, layout: &Layout) -> Result<KpiBundle> {
    // Discovered for the logs only; productivity data comes off the fixed row.
    if let Some(row) = find_last_marker(table, &layout.productivity_marker) {
        debug!(row, "productivity marker row found");
    }

    let daily = extract_series(table, &layout.productivity)?;
    let accumulation = accumulate(&daily);

    let availability_daily = extract_series(table, &layout.availability)?;
    let qty = extract_series(table, &layout.straightpass)?;
    let percentage = pass_flags(&qty);
    let downtime_daily = extract_series(table, &layout.downtime)?;

    debug!(
        productivity = ?&daily[..5.min(daily.len())],
        availability = ?&availability_daily[..5.min(availability_daily.len())],
        straightpass = ?&qty[..5.min(qty.len())],
        "extracted series"
    );

    Ok(KpiBundle {
        productivity: Productivity {
            daily,
            accumulation,
        },
        availability: Availability {
            daily: availability_daily,
            target: vec![AVAILABILITY_TARGET; DAYS_PER_MONTH],
        },
        straightpass: StraightPass {
            qty,
            percentage,
            target: vec![STRAIGHTPASS_TARGET; DAYS_PER_MONTH],
        },
        downtime: Downtime {
            daily: downtime_daily,
        },
    })
}

/// Pull one windowed numeric series out of the table.
///
/// Resolves the source row via the selector, coerces the column window cell
/// by cell, then pads to exactly 31 entries. A missing row or an empty
/// window yields 31 copies of the series' fill value.
fn extract_series(table: &Table, spec: &SeriesSpec) -> Result<Vec<f64>> {
    ensure!(
        spec.columns.start < spec.columns.end,
        "series layout has an empty column window"
    );

    let row = match &spec.selector {
        RowSelector::Fixed { index, min_cols } => {
            table.row(*index).filter(|r| r.len() >= *min_cols)
        }
        RowSelector::LastMarker(rule) => {
            find_last_marker(table, rule).and_then(|i| table.row(i))
        }
    };

    let mut values = Vec::new();
    if let Some(row) = row {
        let end = spec.columns.end.min(row.len());
        for col in spec.columns.start..end {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            values.push(spec.transform.coerce(cell));
        }
    }

    if values.is_empty() {
        return Ok(vec![spec.empty_fill; DAYS_PER_MONTH]);
    }
    values.resize(DAYS_PER_MONTH, 0.0);
    Ok(values)
}

/// Index of the last row matching the marker keywords, if any.
/// Later matches overwrite earlier ones on purpose.
fn find_last_marker(table: &Table, rule: &MarkerRule) -> Option<usize> {
    let mut found = None;
    for (i, row) in table.rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        let text = row.join(" ").to_lowercase();
        if rule.matches(&text) {
            found = Some(i);
        }
    }
    found
}

/// Running average over the positive entries seen so far. A zero day does not
/// reset the average; it repeats the last computed value.
pub fn accumulate(daily: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    daily
        .iter()
        .map(|&v| {
            if v > 0.0 {
                sum += v;
                count += 1;
            }
            if count > 0 {
                sum / f64::from(count)
            } else {
                0.0
            }
        })
        .collect()
}

/// The dashboard flags any day with straight-pass quantity as 100, not a real
/// ratio. Kept as observed pending a call from the domain owner.
pub fn pass_flags(qty: &[f64]) -> Vec<f64> {
    qty.iter()
        .map(|&q| if q > 0.0 { 100.0 } else { 0.0 })
        .collect()
}
