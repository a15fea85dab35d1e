//! Activity Analysis Engine
//!
//! The main entry point that orchestrates the whole pipeline: resolve the
//! per-day file list for the requested window, read and validate each file,
//! resolve string-table codes, filter, clip, and fold every record into the
//! aggregator.
//!
//! ## Control Flow
//!
//! 1. **Scan plan**: the window (optionally expanded to whole local days)
//!    maps to an ordered list of per-day database file names, one day of
//!    padding on each side
//! 2. **Per file**: validate the version header, then walk lines in order:
//!    comments skipped, defining lines fed to the string table, data lines
//!    validated, filtered, clipped, and aggregated
//! 3. **Completion**: a fresh [`Analysis`] snapshot with any collected
//!    warnings, or the first fatal error with file/line provenance
//!
//! An [`Analyzer`] holds configuration only (data directory, time zone,
//! filter, group-by flags, chat-stats toggle). All per-pass state (string
//! table, aggregator, exception collection) is created inside `analyze`, so
//! repeated calls never leak state and `analyze` is idempotent for an
//! unmodified file set.
//!
//! ## Concurrency
//!
//! One pass is strictly sequential: defining lines must be visible to every
//! later line of the same scan, and error line numbers must reflect true
//! source order. The engine never writes to the database files, so any
//! number of analyzer instances may run in parallel.

use anyhow::{anyhow, Result};
use chrono::{Local, TimeZone};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::aggregate::Aggregator;
use crate::chat::CharStatsCollector;
use crate::exception::{ExceptionCollection, Issue};
use crate::filter::{FilterRules, RecordFilter};
use crate::models::{ActivityType, ResultObject, VcsInfo};
use crate::parser::{self, ColumnCount, LineKind};
use crate::scanner;
use crate::schema::{col, GroupByRules, Version, SPLIT_LINE, SUPPORTED_VERSIONS};
use crate::string_table::StringTable;
use crate::window::AnalysisWindow;

/// Result snapshot of one successful `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub result: ResultObject,
    /// Non-fatal issues (currently: lines with more columns than the schema
    /// defines), in source order.
    pub warnings: Vec<Issue>,
}

/// Configured analysis engine for one tracking database directory.
pub struct Analyzer<Tz: TimeZone = Local> {
    data_dir: PathBuf,
    tz: Tz,
    filter: FilterRules,
    group_by: u32,
    chat_stats: bool,
}

/// Per-pass mutable state, created fresh on every `analyze` call.
struct Pass<Tz: TimeZone> {
    window: AnalysisWindow,
    filter: RecordFilter,
    strings: StringTable,
    aggregator: Aggregator<Tz>,
    chat: Option<CharStatsCollector>,
    exceptions: ExceptionCollection,
}

impl Analyzer<Local> {
    /// Analyzer over `data_dir` using the machine's local calendar.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_timezone(data_dir, Local)
    }
}

impl<Tz: TimeZone> Analyzer<Tz> {
    /// Analyzer with an explicit time zone for calendar boundaries, bucket
    /// keys, and file naming.
    pub fn with_timezone(data_dir: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            data_dir: data_dir.into(),
            tz,
            filter: FilterRules::default(),
            group_by: 0,
            chat_stats: false,
        }
    }

    /// Restrict which records are analyzed. Stays in place across calls.
    pub fn set_filter(&mut self, rules: FilterRules) {
        self.filter = rules;
    }

    /// Enable group-by dimensions (see [`crate::schema::group_by`]).
    /// Stays in place across calls.
    pub fn set_group_by(&mut self, flags: u32) {
        self.group_by = flags;
    }

    /// Additionally extract prompt/response character counts from chat
    /// records. The counters start at zero on every `analyze` call and
    /// cover every valid chat line of the scanned files, independent of
    /// filter rules and window clipping.
    pub fn set_chat_stats(&mut self, enabled: bool) {
        self.chat_stats = enabled;
    }

    /// Run one analysis pass over `[start_ms, end_ms]` (epoch milliseconds,
    /// inclusive). With `expand_to_whole_day` the window widens to local
    /// calendar day boundaries first.
    pub fn analyze(
        &self,
        start_ms: i64,
        end_ms: i64,
        expand_to_whole_day: bool,
    ) -> Result<Analysis> {
        let window = AnalysisWindow::new(&self.tz, start_ms, end_ms, expand_to_whole_day)?;
        let plan = scanner::scan_plan(&self.tz, &window)?;
        debug!(
            files = plan.len(),
            start_ms = window.start_ms(),
            end_ms = window.end_ms(),
            "starting analysis pass"
        );

        let mut pass = Pass {
            window,
            filter: RecordFilter::compile(&self.filter),
            strings: StringTable::new(),
            aggregator: Aggregator::new(self.tz.clone(), GroupByRules::from_flags(self.group_by)),
            chat: self.chat_stats.then(CharStatsCollector::new),
            exceptions: ExceptionCollection::new(),
        };

        for entry in plan {
            let path = self.data_dir.join(&entry.file_name);
            if !path.exists() {
                // A day with no activity is normal.
                debug!(file = %entry.file_name, "no database file for this day");
                continue;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(file = %entry.file_name, error = %err, "failed to read database file");
                    return Err(Self::fatal(
                        &mut pass.exceptions,
                        "read file error".to_string(),
                        &entry.file_name,
                        None,
                    ));
                }
            };
            self.analyze_file(&mut pass, &entry.file_name, &content, entry.check_window)?;
        }

        let Pass {
            aggregator,
            chat,
            exceptions,
            ..
        } = pass;
        let mut result = aggregator.into_result();
        if let Some(chat) = chat {
            result.total.char_stats = Some(chat.into_stats());
        }
        Ok(Analysis {
            result,
            warnings: exceptions.into_warnings(),
        })
    }

    fn analyze_file(
        &self,
        pass: &mut Pass<Tz>,
        file_name: &str,
        content: &str,
        check_window: bool,
    ) -> Result<()> {
        let lines: Vec<&str> = content.split(SPLIT_LINE).collect();

        // The first non-blank line declares the format version.
        let mut header_index = 0;
        let version = loop {
            let Some(raw) = lines.get(header_index) else {
                return Err(Self::fatal(
                    &mut pass.exceptions,
                    "empty file".to_string(),
                    file_name,
                    None,
                ));
            };
            let header = raw.trim();
            if header.is_empty() {
                header_index += 1;
                continue;
            }
            match Version::from_header(header) {
                Some(version) => break version,
                None => {
                    return Err(Self::fatal(
                        &mut pass.exceptions,
                        format!(
                            "unsupported version: {header} (supported: {})",
                            SUPPORTED_VERSIONS.join(", ")
                        ),
                        file_name,
                        None,
                    ))
                }
            }
        };

        for (index, raw) in lines.iter().enumerate().skip(header_index + 1) {
            let line_no = index + 1;
            match parser::classify(raw.trim()) {
                LineKind::Blank | LineKind::Comment => {}
                LineKind::Definition(definition) => {
                    if !pass.strings.add_defining_line(definition) {
                        return Err(Self::fatal(
                            &mut pass.exceptions,
                            "defining line is invalid".to_string(),
                            file_name,
                            Some(line_no),
                        ));
                    }
                }
                LineKind::Data(data) => {
                    self.analyze_line(pass, version, data, file_name, line_no, check_window)?;
                }
            }
        }
        Ok(())
    }

    fn analyze_line(
        &self,
        pass: &mut Pass<Tz>,
        version: Version,
        line: &str,
        file_name: &str,
        line_no: usize,
        check_window: bool,
    ) -> Result<()> {
        let mut raw = parser::split_columns(line);
        match parser::check_column_count(version, raw.len()) {
            ColumnCount::TooFew { actual, min } => {
                return Err(Self::fatal(
                    &mut pass.exceptions,
                    format!("columns length is not valid. at least {min}({actual})"),
                    file_name,
                    Some(line_no),
                ));
            }
            ColumnCount::TooMany { actual, max } => {
                pass.exceptions.add_warning(
                    format!("too many columns than {max}({actual})"),
                    file_name,
                    Some(line_no),
                );
                // Proceed using only the columns the schema defines.
                raw.truncate(max);
            }
            ColumnCount::Valid => {}
        }

        let columns = parser::resolve_columns(&pass.strings, &raw);

        // Character statistics are file-scoped: every structurally valid
        // chat line counts, including lines the filter rejects or the
        // window excludes.
        if let Some(chat) = pass.chat.as_mut() {
            chat.observe(
                ActivityType::from_column(columns[col::TYPE]),
                columns[col::LANGUAGE],
                parser::chat_payload(version, &columns),
            );
        }

        let vcs = VcsInfo::from_columns(&columns);
        if !pass.filter.matches(&columns, vcs.as_ref()) {
            return Ok(());
        }

        let Some(mut timing) = parser::parse_timing(&columns) else {
            return Err(Self::fatal(
                &mut pass.exceptions,
                "param \"start time\" or param \"how long\" is not a number".to_string(),
                file_name,
                Some(line_no),
            ));
        };

        if check_window {
            match pass.window.clip(timing.start_ms, timing.duration_ms) {
                Some((start_ms, duration_ms)) => {
                    timing.start_ms = start_ms;
                    timing.duration_ms = duration_ms;
                }
                None => return Ok(()),
            }
        }

        let record = parser::materialize(&columns, timing);
        if let Err(err) = pass.aggregator.add(&record) {
            return Err(Self::fatal(
                &mut pass.exceptions,
                err.to_string(),
                file_name,
                Some(line_no),
            ));
        }
        Ok(())
    }

    fn fatal(
        exceptions: &mut ExceptionCollection,
        message: String,
        file: &str,
        line: Option<usize>,
    ) -> anyhow::Error {
        exceptions.add_error(message, file, line);
        anyhow!("{}", exceptions.error_summary())
    }
}
