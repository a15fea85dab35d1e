//! Analysis Window
//!
//! The inclusive `[start, end]` millisecond range a query covers, plus the
//! clip operation that restricts a record's `[startTime, startTime+duration)`
//! interval to it. Clipping always runs before a record contributes to any
//! aggregate and before hour/day sub-interval splitting.

use anyhow::Result;
use chrono::{Duration, NaiveTime, TimeZone};

use crate::calendar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    start_ms: i64,
    end_ms: i64,
    day_aligned: bool,
}

impl AnalysisWindow {
    /// Build a window from raw bounds. With `expand_to_whole_day` the bounds
    /// widen to the local calendar day: 00:00:00 of the start day through
    /// 23:59:59 of the end day. Only expanded windows are marked day-aligned;
    /// the scanner never skips per-record clipping for unaligned windows.
    pub fn new<Tz: TimeZone>(
        tz: &Tz,
        start_ms: i64,
        end_ms: i64,
        expand_to_whole_day: bool,
    ) -> Result<Self> {
        if !expand_to_whole_day {
            return Ok(Self {
                start_ms,
                end_ms,
                day_aligned: false,
            });
        }
        let start_day = calendar::local_date(tz, start_ms)?;
        let end_day = calendar::local_date(tz, end_ms)?;
        let lo = calendar::to_timestamp(tz, start_day.and_time(NaiveTime::MIN));
        let hi = calendar::to_timestamp(
            tz,
            end_day.and_time(NaiveTime::MIN) + Duration::seconds(86_399),
        );
        Ok(Self {
            start_ms: lo,
            end_ms: hi,
            day_aligned: true,
        })
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Whether the window provably covers whole local calendar days, which
    /// lets interior scan files skip per-record clipping.
    pub fn is_day_aligned(&self) -> bool {
        self.day_aligned
    }

    /// Clip `[start, start+duration)` to the window. Returns the adjusted
    /// `(start, duration)` or `None` when the record lies entirely outside.
    pub fn clip(&self, start_ms: i64, duration_ms: i64) -> Option<(i64, i64)> {
        if start_ms > self.end_ms {
            return None;
        }
        let mut start = start_ms;
        let mut duration = duration_ms;
        if start.saturating_add(duration) > self.end_ms {
            duration = self.end_ms - start;
        }
        if start < self.start_ms {
            if start.saturating_add(duration) < self.start_ms {
                return None;
            }
            duration -= self.start_ms - start;
            start = self.start_ms;
        }
        Some((start, duration))
    }
}
