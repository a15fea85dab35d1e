//! Database File Scanner
//!
//! Turns an analysis window into the ordered list of per-day database file
//! names to read. The collector writes one file per local calendar day named
//! `YYYYMMDD.db`; the scan covers one day before the window start through
//! one day after the window end, because a record written to a neighboring
//! day's file can still overlap the window. Missing files are a normal,
//! silent case (a day with no activity).
//!
//! Only the first two and last two files of the plan can contain records
//! that cross the window edges, so interior files may skip the per-record
//! clip, but only when the window provably covers whole calendar days.
//! Sub-day windows mark every entry for clipping.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, TimeZone};

use crate::calendar;
use crate::window::AnalysisWindow;

/// One entry of the scan plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub file_name: String,
    /// Whether records from this file must be checked against the window.
    pub check_window: bool,
}

/// Database file name for one calendar day.
pub fn file_name_for_date(date: NaiveDate) -> String {
    format!("{}.db", date.format("%Y%m%d"))
}

/// Compute the ordered scan plan for a window, in date order.
pub fn scan_plan<Tz: TimeZone>(tz: &Tz, window: &AnalysisWindow) -> Result<Vec<ScanEntry>> {
    let start_date = calendar::local_date(tz, window.start_ms())?;
    let end_date = calendar::local_date(tz, window.end_ms())?;

    let first = start_date
        .pred_opt()
        .ok_or_else(|| anyhow!("date out of range before {}", start_date))?;
    let last = end_date
        .succ_opt()
        .ok_or_else(|| anyhow!("date out of range after {}", end_date))?;

    let mut dates = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        dates.push(cursor);
        cursor = cursor
            .succ_opt()
            .ok_or_else(|| anyhow!("date out of range after {}", cursor))?;
    }

    let count = dates.len();
    let plan = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| ScanEntry {
            file_name: file_name_for_date(date),
            check_window: !window.is_day_aligned() || i < 2 || i >= count - 2,
        })
        .collect();
    Ok(plan)
}
