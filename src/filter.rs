//! Record Filtering
//!
//! Declarative per-column allow-lists compiled once per analysis pass into a
//! predicate over resolved columns and VCS context. An absent rule leaves a
//! column unrestricted; an empty rule set compiles to a predicate that
//! includes everything.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::VcsInfo;
use crate::schema::col;

/// Per-column allow-lists. `None` means no restriction on that column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    pub computer: Option<Vec<String>>,
    pub project: Option<Vec<String>>,
    pub language: Option<Vec<String>>,
    /// Matches the path/command column.
    pub file: Option<Vec<String>>,
    pub vcs_repo: Option<Vec<String>>,
    pub vcs_branch: Option<Vec<String>>,
}

impl FilterRules {
    pub fn is_unrestricted(&self) -> bool {
        self.computer.is_none()
            && self.project.is_none()
            && self.language.is_none()
            && self.file.is_none()
            && self.vcs_repo.is_none()
            && self.vcs_branch.is_none()
    }
}

/// Compiled form of [`FilterRules`]: one hash set per restricted column.
#[derive(Debug, Default)]
pub struct RecordFilter {
    columns: Vec<(usize, HashSet<String>)>,
    vcs_repo: Option<HashSet<String>>,
    vcs_branch: Option<HashSet<String>>,
}

fn to_set(list: &Option<Vec<String>>) -> Option<HashSet<String>> {
    list.as_ref()
        .map(|values| values.iter().cloned().collect())
}

impl RecordFilter {
    pub fn compile(rules: &FilterRules) -> Self {
        let mut columns = Vec::new();
        for (index, list) in [
            (col::COMPUTER, &rules.computer),
            (col::PROJECT, &rules.project),
            (col::LANGUAGE, &rules.language),
            (col::TARGET, &rules.file),
        ] {
            if let Some(set) = to_set(list) {
                columns.push((index, set));
            }
        }
        Self {
            columns,
            vcs_repo: to_set(&rules.vcs_repo),
            vcs_branch: to_set(&rules.vcs_branch),
        }
    }

    /// Test one record against every configured allow-list. Columns the line
    /// does not carry (v3 lines and VCS rules) fail the restriction.
    pub fn matches(&self, columns: &[&str], vcs: Option<&VcsInfo>) -> bool {
        for (index, allowed) in &self.columns {
            match columns.get(*index) {
                Some(value) if allowed.contains(*value) => {}
                _ => return false,
            }
        }
        if let Some(allowed) = &self.vcs_repo {
            let repo = vcs.map(|v| v.repo).unwrap_or("");
            if !allowed.contains(repo) {
                return false;
            }
        }
        if let Some(allowed) = &self.vcs_branch {
            let branch = vcs.map(|v| v.branch).unwrap_or("");
            if !allowed.contains(branch) {
                return false;
            }
        }
        true
    }
}
