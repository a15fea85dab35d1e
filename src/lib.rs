//! Coding Tracker Analysis Library
//!
//! A Rust library for analyzing coding-activity tracking databases: plain-text,
//! append-only files the tracking collector writes, one per local calendar day,
//! holding space-separated activity records (watching, coding, terminal, chat).
//!
//! ## Core Features
//!
//! - **Windowed analysis**: Query any `[start, end]` millisecond range; records
//!   straddling the edges are clipped so only in-window time is counted
//! - **Multi-dimensional aggregation**: Coding/watching totals grouped by
//!   computer, project, file, language, terminal command, VCS triple, hour, day
//! - **Calendar-aware splitting**: Hour and day buckets follow the local
//!   wall-clock calendar, including DST transitions
//! - **String-table compression**: Long repeated values (paths, branch names)
//!   resolve through per-file defining lines
//! - **Chat statistics**: Optional prompt/response character counts from chat
//!   activity records
//!
//! ## Architecture Overview
//!
//! - [`models`] - Record, result, and bucket-map types
//! - [`schema`] - Format versions, column layout, group-by flags
//! - [`scanner`] - Window to per-day file-name plan
//! - [`parser`] - Line classification, column validation, record building
//! - [`string_table`] - Defining-line resolution
//! - [`filter`] - Allow-list record filtering
//! - [`window`] - Time-window clipping
//! - [`calendar`] - Local-time boundary math and bucket keys
//! - [`aggregate`] - Totals and per-dimension bucket folding
//! - [`chat`] - Chat character-statistics collection
//! - [`exception`] - Error/warning accumulation with file/line provenance
//! - [`analyzer`] - Main analysis engine orchestrating the pipeline
//! - [`config`] - Configuration management with environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//! - [`display`] - Terminal and JSON output formatting
//!
//! ## Main Entry Point
//!
//! The primary interface is [`Analyzer`]:
//!
//! ```rust,no_run
//! use coding_tracker::{Analyzer, schema::group_by};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut analyzer = Analyzer::new("/home/alice/.coding-tracker/database");
//! analyzer.set_group_by(group_by::PROJECT | group_by::LANGUAGE);
//!
//! let analysis = analyzer.analyze(1_721_433_600_000, 1_721_519_999_000, true)?;
//! println!("coding: {}ms", analysis.result.total.coding);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod calendar;
pub mod chat;
pub mod config;
pub mod display;
pub mod exception;
pub mod filter;
pub mod logging;
pub mod models;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod string_table;
pub mod window;

pub use analyzer::{Analysis, Analyzer};
pub use filter::FilterRules;
pub use models::ResultObject;
pub use schema::group_by;
