//! Core Data Models
//!
//! Data structures the analysis pipeline operates on, from the per-line
//! [`ActivityRecord`] the parser materializes to the [`ResultObject`] an
//! analysis pass returns.
//!
//! ## Data Flow
//!
//! 1. **Raw line** → [`ActivityRecord`] (borrowed from the file content,
//!    consumed immediately; records are never retained after the pass)
//! 2. **Aggregation** → [`ResultObject`] with running totals and one bucket
//!    map per enabled group-by dimension
//!
//! ## Wire Format
//!
//! [`ResultObject`] is a format-stable external contract consumed by report
//! rendering and export; field names serialize in camelCase (`groupBy`,
//! `charStats`), all durations are milliseconds.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::schema::{col, COLUMN_COUNT_4_MIN};

/// Bucket key used when a record lacks a value for a dimension.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Bucket key for records with no VCS context.
pub const VCS_EMPTY_KEY: &str = "::";

/// Activity type carried in the first column of a data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    /// Passive viewing (type code 0). Unrecognized codes also land here.
    Watching,
    /// Active edits (type code 2).
    Coding,
    /// Terminal command activity (type code 3).
    Terminal,
    /// Chat/prompt activity (type code 4).
    Chat,
}

impl ActivityType {
    pub fn from_column(value: &str) -> Self {
        match value {
            "2" => ActivityType::Coding,
            "3" => ActivityType::Terminal,
            "4" => ActivityType::Chat,
            _ => ActivityType::Watching,
        }
    }

    /// Coding time covers active edits and terminal activity; everything
    /// else (watching, chat) counts as watching time.
    pub fn is_coding(self) -> bool {
        matches!(self, ActivityType::Coding | ActivityType::Terminal)
    }
}

/// Version-control context of a v4 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsInfo<'a> {
    pub vcs_type: &'a str,
    pub repo: &'a str,
    pub branch: &'a str,
}

impl<'a> VcsInfo<'a> {
    /// Extract the VCS triple from resolved columns. Lines without the v4
    /// columns, or with an empty VCS type, carry no VCS context.
    pub fn from_columns(columns: &[&'a str]) -> Option<Self> {
        if columns.len() < COLUMN_COUNT_4_MIN || columns[col::VCS_TYPE].is_empty() {
            return None;
        }
        Some(Self {
            vcs_type: columns[col::VCS_TYPE],
            repo: columns[col::VCS_REPO],
            branch: columns[col::VCS_BRANCH],
        })
    }

    /// Colon-joined bucket key.
    pub fn bucket_key(&self) -> String {
        format!("{}:{}:{}", self.vcs_type, self.repo, self.branch)
    }
}

/// One parsed data line, already string-table resolved and window clipped.
/// Borrows from the file content; consumed by the aggregator and dropped.
#[derive(Debug, Clone, Copy)]
pub struct ActivityRecord<'a> {
    pub kind: ActivityType,
    /// Epoch milliseconds, clipped to the analysis window.
    pub start_ms: i64,
    /// Milliseconds, clipped to the analysis window. Never negative.
    pub duration_ms: i64,
    pub language: &'a str,
    /// File path for file activity, command for terminal activity.
    pub target: &'a str,
    pub project: &'a str,
    pub computer: &'a str,
    pub vcs: Option<VcsInfo<'a>>,
}

/// Coding/watching millisecond pair for one bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TimePair {
    pub coding: i64,
    pub watching: i64,
}

impl TimePair {
    pub fn add(&mut self, duration_ms: i64, is_coding: bool) {
        if is_coding {
            self.coding += duration_ms;
        } else {
            self.watching += duration_ms;
        }
    }
}

/// Prompt/response character counters extracted from chat records.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CharStats {
    pub prompt: i64,
    pub response: i64,
}

/// Running totals of one analysis pass.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TotalStats {
    pub coding: i64,
    pub watching: i64,
    #[serde(rename = "charStats", skip_serializing_if = "Option::is_none")]
    pub char_stats: Option<CharStats>,
}

/// Map from bucket key to accumulated durations. `BTreeMap` keeps
/// serialization order deterministic so identical analyses yield
/// bit-identical output.
pub type BucketMap = BTreeMap<String, TimePair>;

/// One bucket map per group-by dimension. Dimensions that were not enabled
/// (or collected nothing) stay empty and are omitted from JSON output.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GroupByResult {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub computer: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub project: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub file: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub language: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub terminal: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vcs: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hour: BucketMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub day: BucketMap,
}

/// Immutable result snapshot of one analysis pass.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ResultObject {
    pub total: TotalStats,
    #[serde(rename = "groupBy")]
    pub group_by: GroupByResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_from_column() {
        assert_eq!(ActivityType::from_column("0"), ActivityType::Watching);
        assert_eq!(ActivityType::from_column("2"), ActivityType::Coding);
        assert_eq!(ActivityType::from_column("3"), ActivityType::Terminal);
        assert_eq!(ActivityType::from_column("4"), ActivityType::Chat);
        // Unknown codes count as watching, never dropped.
        assert_eq!(ActivityType::from_column("9"), ActivityType::Watching);
        assert!(!ActivityType::Chat.is_coding());
        assert!(ActivityType::Terminal.is_coding());
    }

    #[test]
    fn test_vcs_info_extraction() {
        let v4: Vec<&str> = "2 0 0 rust src/main.rs proj pc git repo main 1 2"
            .split(' ')
            .collect();
        let vcs = VcsInfo::from_columns(&v4).expect("vcs triple present");
        assert_eq!(vcs.bucket_key(), "git:repo:main");

        let v3: Vec<&str> = "2 0 0 rust src/main.rs proj pc".split(' ').collect();
        assert!(VcsInfo::from_columns(&v3).is_none());

        let empty_type: Vec<&str> = "2 0 0 rust src/main.rs proj pc  repo main 1 2"
            .split(' ')
            .collect();
        assert!(VcsInfo::from_columns(&empty_type).is_none());
    }

    #[test]
    fn test_result_serialization_shape() {
        let mut result = ResultObject::default();
        result.total.coding = 1500;
        result.total.char_stats = Some(CharStats {
            prompt: 12,
            response: 34,
        });
        result
            .group_by
            .language
            .entry("rust".to_string())
            .or_default()
            .add(1500, true);

        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["total"]["coding"], 1500);
        assert_eq!(json["total"]["charStats"]["prompt"], 12);
        assert_eq!(json["groupBy"]["language"]["rust"]["coding"], 1500);
        // Empty dimensions are omitted entirely.
        assert!(json["groupBy"].get("hour").is_none());
    }

    #[test]
    fn test_char_stats_omitted_when_absent() {
        let result = ResultObject::default();
        let json = serde_json::to_value(&result).expect("serialize result");
        assert!(json["total"].get("charStats").is_none());
    }
}
