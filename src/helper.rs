use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use log::{trace, warn};

use crate::{Result, WorkdeskError};

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's calendar date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Derives a record id from the clock, bumped past `existing` ids when the
/// clock has not moved on since the last one was handed out.
pub fn clock_id<I>(now_ms: i64, existing: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let candidate = u64::try_from(now_ms).unwrap_or(0);
    let id = next_id(candidate, existing);
    if id != candidate {
        trace!("Clock id {} already taken, using {}", candidate, id);
    }
    id
}

/// Picks an id that is not in `existing`: `floor` when every id is below it,
/// otherwise one past the highest.
///
/// When the highest id is `u64::MAX` there is nothing above it, so the
/// lowest free id from `floor` upwards (wrapping to 0) is used instead.
pub fn next_id<I>(floor: u64, existing: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let taken: BTreeSet<u64> = existing.into_iter().collect();
    match taken.last() {
        Some(&max) if max >= floor => max.checked_add(1).unwrap_or_else(|| {
            warn!("Id space above {} is exhausted, reusing a free lower id", floor);
            (floor..=u64::MAX)
                .chain(0..floor)
                .find(|id| !taken.contains(id))
                .unwrap_or(floor)
        }),
        _ => floor,
    }
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| WorkdeskError::InvalidDate {
        value: value.to_string(),
    })
}

/// Resolves an optional date argument, defaulting to today
pub fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    value.map(parse_date).unwrap_or_else(|| Ok(today()))
}
