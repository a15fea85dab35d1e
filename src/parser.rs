//! Line Parser and Validator
//!
//! Stateless helpers the analyzer drives once per line: classification
//! (comment, string-table definition, data), column splitting, column-count
//! validation against the schema registry, numeric parsing of the time
//! columns, and materialization of the [`ActivityRecord`] the aggregator
//! consumes. All provenance (file name, 1-based line number) and the
//! fatal/warning escalation live with the caller, which owns the exception
//! collection.

use crate::models::{ActivityRecord, ActivityType, VcsInfo};
use crate::schema::{col, Version, COLUMN_COUNT_4_MIN, SPLIT_COLUMN};
use crate::string_table::StringTable;

/// Classification of one trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// String-table defining line, `d`-prefixed.
    Definition(&'a str),
    Data(&'a str),
}

pub fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        LineKind::Blank
    } else if line.starts_with('#') {
        LineKind::Comment
    } else if line.starts_with('d') {
        LineKind::Definition(line)
    } else {
        LineKind::Data(line)
    }
}

pub fn split_columns(line: &str) -> Vec<&str> {
    line.split(SPLIT_COLUMN).collect()
}

/// Outcome of validating a data line's column count against its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCount {
    Valid,
    /// Fatal: below the version's minimum.
    TooFew { actual: usize, min: usize },
    /// Warning: above the maximum; the line is still analyzed using only
    /// the columns the schema defines.
    TooMany { actual: usize, max: usize },
}

pub fn check_column_count(version: Version, actual: usize) -> ColumnCount {
    let min = version.min_columns();
    let max = version.max_columns();
    if actual < min {
        ColumnCount::TooFew { actual, min }
    } else if actual > max {
        ColumnCount::TooMany { actual, max }
    } else {
        ColumnCount::Valid
    }
}

/// Resolve every column through the string table. Undefined codes (and
/// literal values) pass through unchanged.
pub fn resolve_columns<'a>(table: &'a StringTable, raw: &[&'a str]) -> Vec<&'a str> {
    raw.iter().map(|column| table.resolve(column)).collect()
}

/// The numeric time columns of a data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub start_ms: i64,
    pub duration_ms: i64,
}

/// Parse startTime/duration. `None` means a non-numeric value, which the
/// caller reports as a fatal parse error.
pub fn parse_timing(columns: &[&str]) -> Option<Timing> {
    let start_ms = columns.get(col::START_TIME)?.parse::<i64>().ok()?;
    let duration_ms = columns.get(col::DURATION)?.parse::<i64>().ok()?;
    Some(Timing {
        start_ms,
        duration_ms,
    })
}

/// Build the record the aggregator consumes, from resolved columns and the
/// (possibly clipped) timing.
pub fn materialize<'a>(columns: &[&'a str], timing: Timing) -> ActivityRecord<'a> {
    ActivityRecord {
        kind: ActivityType::from_column(columns[col::TYPE]),
        start_ms: timing.start_ms,
        duration_ms: timing.duration_ms,
        language: columns[col::LANGUAGE],
        target: columns[col::TARGET],
        project: columns[col::PROJECT],
        computer: columns[col::COMPUTER],
        vcs: VcsInfo::from_columns(columns),
    }
}

/// The trailing chat payload column of a v4 data line, when present.
pub fn chat_payload<'a>(version: Version, columns: &[&'a str]) -> Option<&'a str> {
    if version == Version::V4 && columns.len() > COLUMN_COUNT_4_MIN {
        columns.last().copied()
    } else {
        None
    }
}
