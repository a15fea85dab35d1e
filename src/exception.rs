//! Exception Collection
//!
//! Per-analysis accumulation of errors and warnings with file/line
//! provenance. Errors are fatal to the current analysis (the multi-file scan
//! aborts on the first one); warnings ride along on a successful result.

use std::fmt;

/// One recorded error or warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub message: String,
    pub file: String,
    /// 1-based line number within the file, when known.
    pub line: Option<usize>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file, line, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct ExceptionCollection {
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
}

impl ExceptionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>, file: impl Into<String>, line: Option<usize>) {
        self.errors.push(Issue {
            message: message.into(),
            file: file.into(),
            line,
        });
    }

    pub fn add_warning(&mut self, message: impl Into<String>, file: impl Into<String>, line: Option<usize>) {
        self.warnings.push(Issue {
            message: message.into(),
            file: file.into(),
            line,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Issue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }

    /// Formatted accumulation of all errors, in source order.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(Issue::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn into_warnings(self) -> Vec<Issue> {
        self.warnings
    }
}
