//! Instance lifetime and line-item cost
//!
//! Converts a creation/end timestamp pair into billable hours and multiplies by
//! an hourly rate. Any started hour is billed as a full hour.
//!
//! Each timestamp is parsed on its own against `TIMESTAMP_FORMATS`, first match
//! wins, so the creation and end strings may use different formats. All
//! supported formats carry an explicit zero UTC offset.
//!
//! Costs are rounded to 3 decimals half away from zero (`f64::round`) at the
//! moment a line item is computed.

use crate::error::{CostError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Accepted timestamp patterns, tried in order.
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S+00:00",
    "%Y-%m-%d %H:%M:%S%.f+00:00",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

const SECONDS_PER_HOUR: i64 = 3600;

const MAX_FRACTION_DIGITS: usize = 9;

/// Parse a provider timestamp into an absolute UTC instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| parse_exact(value, fmt))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CostError::MalformedTimestamp {
            value: value.to_string(),
        })
}

/// Parse `value` with `fmt`, accepting only the zero-padded fixed-width shape.
///
/// chrono tolerates unpadded fields and extra whitespace, so the parsed value is
/// rendered back with the same pattern and must reproduce the input exactly.
/// The fractional part is checked separately: 1 to 9 digits.
fn parse_exact(value: &str, fmt: &str) -> Option<NaiveDateTime> {
    let naive = NaiveDateTime::parse_from_str(value, fmt).ok()?;

    let canonical = match fmt.split_once("%.f") {
        None => naive.format(fmt).to_string() == value,
        Some((head, tail)) => {
            let head = naive.format(head).to_string();
            value
                .strip_prefix(head.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|rest| rest.strip_suffix(tail))
                .is_some_and(|digits| {
                    (1..=MAX_FRACTION_DIGITS).contains(&digits.len())
                        && digits.bytes().all(|b| b.is_ascii_digit())
                })
        }
    };

    canonical.then_some(naive)
}

/// Whole hours billed for the interval, rounded up.
pub fn billable_hours(created: &str, ended: &str) -> Result<i64> {
    let start = parse_timestamp(created)?;
    let end = parse_timestamp(ended)?;

    // whole-second resolution; fractional seconds are dropped from each side
    let elapsed = end.timestamp() - start.timestamp();
    if elapsed < 0 {
        return Err(CostError::InvalidInterval {
            created: created.to_string(),
            ended: ended.to_string(),
        });
    }

    let mut hours = elapsed / SECONDS_PER_HOUR;
    if elapsed % SECONDS_PER_HOUR != 0 {
        hours += 1;
    }
    Ok(hours)
}

/// Round to 3 decimal places, half away from zero.
pub fn round_cost(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Billable hours and rounded cost for one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub hours: i64,
    pub cost: f64,
}

impl Lifetime {
    pub fn compute(created: &str, ended: &str, hourly_rate: f64) -> Result<Self> {
        let hours = billable_hours(created, ended)?;
        Ok(Self {
            hours,
            cost: round_cost(hours as f64 * hourly_rate),
        })
    }
}
