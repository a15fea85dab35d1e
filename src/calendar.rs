//! Calendar Arithmetic
//!
//! Time-zone aware helpers shared by the file scanner and the aggregator.
//! All engine timestamps are epoch milliseconds; bucket keys and file names
//! come from the wall-clock calendar of the analyzer's configured zone
//! (`Local` in production, `Utc` in tests for determinism).
//!
//! Boundary computation is calendar-aligned, never fixed-size stepping:
//! the next hour/day boundary is recomputed from the local calendar each
//! time, so DST transitions and month-length irregularities are respected.
//! DST gaps (a local midnight or hour that does not exist) fall forward to
//! the next representable instant; DST folds resolve to the earlier instant,
//! with a monotonicity guard at the call sites that walk intervals.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

pub const MS_1_HOUR: i64 = 3600 * 1000;
pub const MS_1_DAY: i64 = 24 * MS_1_HOUR;

/// Convert epoch milliseconds to the wall-clock datetime of `tz`.
pub fn local_datetime<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Result<NaiveDateTime> {
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .ok_or_else(|| anyhow!("timestamp out of range: {}", timestamp_ms))?;
    Ok(utc.with_timezone(tz).naive_local())
}

/// Calendar date of an epoch-millisecond instant in `tz`.
pub fn local_date<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Result<NaiveDate> {
    Ok(local_datetime(tz, timestamp_ms)?.date())
}

/// Convert a wall-clock datetime of `tz` back to epoch milliseconds.
///
/// Ambiguous local times (DST fold) map to the earlier instant; nonexistent
/// local times (DST gap) fall forward hour by hour until they map.
pub fn to_timestamp<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> i64 {
    let mut probe = naive;
    for _ in 0..4 {
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => return dt.timestamp_millis(),
            LocalResult::Ambiguous(earlier, _) => return earlier.timestamp_millis(),
            LocalResult::None => probe += Duration::hours(1),
        }
    }
    // Gaps longer than four hours do not occur in real zones.
    Utc.from_utc_datetime(&naive).timestamp_millis()
}

/// Wall-clock datetime truncated to the start of its hour.
pub fn hour_floor(naive: NaiveDateTime) -> NaiveDateTime {
    naive
        .date()
        .and_hms_opt(naive.hour(), 0, 0)
        .unwrap_or(naive)
}

/// Wall-clock datetime truncated to the start of its day.
pub fn day_floor(naive: NaiveDateTime) -> NaiveDateTime {
    naive.date().and_hms_opt(0, 0, 0).unwrap_or(naive)
}

/// Epoch milliseconds of the next calendar hour boundary after `timestamp_ms`.
/// Guaranteed to be strictly greater than `timestamp_ms`.
pub fn next_hour_boundary<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Result<i64> {
    let floor = hour_floor(local_datetime(tz, timestamp_ms)?);
    let next = floor
        .checked_add_signed(Duration::hours(1))
        .ok_or_else(|| anyhow!("datetime out of range after {}", floor))?;
    let boundary = to_timestamp(tz, next);
    if boundary > timestamp_ms {
        Ok(boundary)
    } else {
        // DST fold mapped the boundary behind the cursor; step a raw hour
        // so interval walks always advance.
        Ok(timestamp_ms + MS_1_HOUR)
    }
}

/// Epoch milliseconds of the next calendar day boundary after `timestamp_ms`.
/// Guaranteed to be strictly greater than `timestamp_ms`.
pub fn next_day_boundary<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Result<i64> {
    let floor = day_floor(local_datetime(tz, timestamp_ms)?);
    let next = floor
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| anyhow!("datetime out of range after {}", floor))?;
    let boundary = to_timestamp(tz, next);
    if boundary > timestamp_ms {
        Ok(boundary)
    } else {
        Ok(timestamp_ms + MS_1_DAY)
    }
}

/// Hour bucket key (`YYYYMMDDHH`) of an instant in `tz`.
pub fn hour_key<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Result<String> {
    Ok(local_datetime(tz, timestamp_ms)?
        .format("%Y%m%d%H")
        .to_string())
}

/// Day bucket key (`YYYYMMDD`) of an instant in `tz`.
pub fn day_key<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Result<String> {
    Ok(local_datetime(tz, timestamp_ms)?.format("%Y%m%d").to_string())
}
