//! In-File String Table
//!
//! Database files shrink repeated long values (file paths, project
//! directories) by declaring them once on a defining line and referencing a
//! short code afterwards. A defining line is `d<code>=<value>`, for example:
//!
//! ```text
//! d!0=/home/alice/work/tracker/src/analyzer.rs
//! ```
//!
//! after which a data column containing `!0` resolves to the full path.
//! Defining lines always precede their first use within the same linear
//! scan, so a single forward pass suffices. The table is scoped to exactly
//! one analysis pass and is rebuilt from scratch on every `analyze` call.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct StringTable {
    map: HashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `d`-prefixed defining line and store the code→string pair.
    /// Returns `false` for malformed lines (missing `=`, empty code); the
    /// caller escalates that to a fatal parse error.
    pub fn add_defining_line(&mut self, line: &str) -> bool {
        let body = match line.strip_prefix('d') {
            Some(body) => body,
            None => return false,
        };
        let (code, value) = match body.split_once('=') {
            Some(pair) => pair,
            None => return false,
        };
        if code.is_empty() {
            return false;
        }
        self.map.insert(code.to_string(), value.to_string());
        true
    }

    /// Resolve a column value. Codes that were never defined come back
    /// unchanged, so literal values coexist with coded ones.
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        self.map.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
