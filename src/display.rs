//! Output Formatting and Display Management
//!
//! Handles all output formatting for analysis results: human-readable
//! terminal output with colors, and structured JSON for programmatic
//! consumption. Rendering options (pretty vs compact JSON, the report
//! timestamp format) come from [`crate::config::OutputConfig`].
//!
//! ## Output Formats
//!
//! ### Terminal Output
//! - Coding/watching totals as human-friendly durations
//! - One section per requested group-by dimension, buckets in key order
//! - Chat character statistics when collected
//! - Warnings printed to stderr so stdout stays clean
//!
//! ### JSON Output
//! The result object serialized as-is:
//! ```json
//! {
//!   "total": { "coding": 5400000, "watching": 7200000 },
//!   "groupBy": {
//!     "language": { "rust": { "coding": 5400000, "watching": 7200000 } }
//!   }
//! }
//! ```

use crate::analyzer::Analysis;
use crate::config::OutputConfig;
use crate::models::{BucketMap, ResultObject};
use chrono::Local;
use colored::Colorize;

pub struct DisplayManager {
    json_pretty: bool,
    timestamp_format: String,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self {
            json_pretty: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            json_pretty: output.json_pretty,
            timestamp_format: output.timestamp_format.clone(),
        }
    }

    pub fn display_report(&self, analysis: &Analysis, json_output: bool) {
        for warning in &analysis.warnings {
            eprintln!("{} {}", "warning:".bright_yellow().bold(), warning);
        }

        if json_output {
            match self.render_json(&analysis.result) {
                Ok(json_str) => println!("{}", json_str),
                Err(e) => eprintln!("Error serializing result to JSON: {}", e),
            }
            return;
        }

        let total = &analysis.result.total;
        println!("\n{}", "=".repeat(60).bright_cyan());
        println!("{}", "Coding Tracker Report".bright_white().bold());
        println!(
            "{}",
            format!("generated {}", self.timestamp_line()).bright_black()
        );
        println!("{}", "=".repeat(60).bright_cyan());
        println!(
            "\n{} coding • {} watching\n",
            format_duration(total.coding).bright_green().bold(),
            format_duration(total.watching).bright_white().bold()
        );

        if let Some(chars) = &total.char_stats {
            println!(
                "{} {} prompt chars • {} response chars\n",
                "chat:".bright_blue(),
                chars.prompt.to_string().bright_white().bold(),
                chars.response.to_string().bright_white().bold()
            );
        }

        let group_by = &analysis.result.group_by;
        self.display_buckets("By computer", &group_by.computer);
        self.display_buckets("By project", &group_by.project);
        self.display_buckets("By file", &group_by.file);
        self.display_buckets("By language", &group_by.language);
        self.display_buckets("By terminal command", &group_by.terminal);
        self.display_buckets("By repository", &group_by.vcs);
        self.display_buckets("By hour", &group_by.hour);
        self.display_buckets("By day", &group_by.day);
    }

    fn render_json(&self, result: &ResultObject) -> serde_json::Result<String> {
        if self.json_pretty {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string(result)
        }
    }

    fn timestamp_line(&self) -> String {
        Local::now().format(&self.timestamp_format).to_string()
    }

    fn display_buckets(&self, title: &str, buckets: &BucketMap) {
        if buckets.is_empty() {
            return;
        }
        println!("{}", title.bright_white().bold());
        for (key, pair) in buckets {
            println!(
                "  {} — {} coding, {} watching",
                key.bright_blue(),
                format_duration(pair.coding).bright_green(),
                format_duration(pair.watching)
            );
        }
        println!();
    }
}

/// Millisecond duration as a compact `2h 15m 30s` string.
fn format_duration(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
