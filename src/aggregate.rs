//! Multi-Dimensional Aggregator
//!
//! Folds clipped [`ActivityRecord`]s into running totals plus one bucket map
//! per enabled group-by dimension.
//!
//! Scalar dimensions (computer, project, file, language, terminal, vcs) add
//! the full clipped duration to a single bucket keyed by the resolved field
//! value; records lacking a value bucket under `"unknown"`, never dropped.
//! The terminal dimension only accumulates for terminal-type records, and
//! the VCS key is the colon-joined triple (`"::"` when absent).
//!
//! Temporal dimensions (hour, day) split the clipped interval across the
//! calendar-aligned steps it spans. Each step's boundary is recomputed from
//! the wall-clock calendar (see [`crate::calendar`]) and the portion added to
//! a bucket keyed `YYYYMMDDHH` or `YYYYMMDD`. The next cut is always
//! `min(interval end, step boundary)` and the true remainder becomes the
//! final sub-duration, so the sub-bucket durations of one record sum to its
//! clipped duration exactly.

use anyhow::Result;
use chrono::TimeZone;

use crate::calendar;
use crate::models::{
    ActivityRecord, ActivityType, BucketMap, ResultObject, TimePair, UNKNOWN_BUCKET, VCS_EMPTY_KEY,
};
use crate::schema::GroupByRules;

pub struct Aggregator<Tz: TimeZone> {
    tz: Tz,
    rules: GroupByRules,
    result: ResultObject,
}

fn add_to_bucket(map: &mut BucketMap, name: &str, duration_ms: i64, is_coding: bool) {
    let key = if name.is_empty() { UNKNOWN_BUCKET } else { name };
    map.entry(key.to_string())
        .or_insert_with(TimePair::default)
        .add(duration_ms, is_coding);
}

impl<Tz: TimeZone> Aggregator<Tz> {
    pub fn new(tz: Tz, rules: GroupByRules) -> Self {
        Self {
            tz,
            rules,
            result: ResultObject::default(),
        }
    }

    /// Fold one clipped record into the totals and every enabled dimension.
    pub fn add(&mut self, record: &ActivityRecord) -> Result<()> {
        let is_coding = record.kind.is_coding();
        let duration = record.duration_ms;

        if is_coding {
            self.result.total.coding += duration;
        } else {
            self.result.total.watching += duration;
        }

        let group_by = &mut self.result.group_by;
        if self.rules.computer {
            add_to_bucket(&mut group_by.computer, record.computer, duration, is_coding);
        }
        if self.rules.project {
            add_to_bucket(&mut group_by.project, record.project, duration, is_coding);
        }
        if self.rules.file {
            add_to_bucket(&mut group_by.file, record.target, duration, is_coding);
        }
        if self.rules.language {
            add_to_bucket(&mut group_by.language, record.language, duration, is_coding);
        }
        if self.rules.terminal && record.kind == ActivityType::Terminal {
            add_to_bucket(&mut group_by.terminal, record.target, duration, is_coding);
        }
        if self.rules.vcs {
            let key = record
                .vcs
                .map(|v| v.bucket_key())
                .unwrap_or_else(|| VCS_EMPTY_KEY.to_string());
            add_to_bucket(&mut group_by.vcs, &key, duration, is_coding);
        }

        if self.rules.hour {
            for (key, portion) in split_by_hour(&self.tz, record.start_ms, duration)? {
                add_to_bucket(&mut group_by.hour, &key, portion, is_coding);
            }
        }
        if self.rules.day {
            for (key, portion) in split_by_day(&self.tz, record.start_ms, duration)? {
                add_to_bucket(&mut group_by.day, &key, portion, is_coding);
            }
        }
        Ok(())
    }

    /// Take the immutable result snapshot of this pass.
    pub fn into_result(self) -> ResultObject {
        self.result
    }
}

/// Split `[start, start+duration)` across the calendar hours it spans.
/// Returns `(YYYYMMDDHH key, portion)` pairs whose portions sum to
/// `duration_ms` exactly.
pub fn split_by_hour<Tz: TimeZone>(
    tz: &Tz,
    start_ms: i64,
    duration_ms: i64,
) -> Result<Vec<(String, i64)>> {
    split_calendar(start_ms, duration_ms, |cursor| {
        Ok((
            calendar::hour_key(tz, cursor)?,
            calendar::next_hour_boundary(tz, cursor)?,
        ))
    })
}

/// Split `[start, start+duration)` across the calendar days it spans.
/// Returns `(YYYYMMDD key, portion)` pairs whose portions sum to
/// `duration_ms` exactly.
pub fn split_by_day<Tz: TimeZone>(
    tz: &Tz,
    start_ms: i64,
    duration_ms: i64,
) -> Result<Vec<(String, i64)>> {
    split_calendar(start_ms, duration_ms, |cursor| {
        Ok((
            calendar::day_key(tz, cursor)?,
            calendar::next_day_boundary(tz, cursor)?,
        ))
    })
}

fn split_calendar(
    start_ms: i64,
    duration_ms: i64,
    mut step: impl FnMut(i64) -> Result<(String, i64)>,
) -> Result<Vec<(String, i64)>> {
    let end = start_ms.saturating_add(duration_ms);
    let mut out = Vec::new();
    let mut cursor = start_ms;
    while cursor < end {
        let (key, boundary) = step(cursor)?;
        let next = boundary.min(end);
        out.push((key, next - cursor));
        cursor = next;
    }
    Ok(out)
}
