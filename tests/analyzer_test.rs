//! End-to-end analysis tests over temporary database directories.
//!
//! All fixtures run in UTC so bucket keys and calendar boundaries are
//! machine-independent.

use chrono::Utc;
use coding_tracker::{group_by, Analyzer, FilterRules};
use std::fs;
use tempfile::TempDir;

// 2024-07-20T18:26:40Z
const TS: i64 = 1_721_500_000_000;
// 2024-07-20T00:00:00Z
const DAY_START: i64 = 1_721_433_600_000;

fn write_db(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).expect("write fixture");
}

fn analyzer(dir: &TempDir) -> Analyzer<Utc> {
    Analyzer::with_timezone(dir.path(), Utc)
}

#[test]
fn test_terminal_and_chat_aggregation() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "4.0\n\
             3 {} 500 terminal cargo proj pc git repo main 0 0\n\
             4 {} 1000 chat - proj pc git repo main 0 0 123,456\n",
            TS + 1000,
            TS
        ),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::ALL);
    analyzer.set_chat_stats(true);
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    let total = &analysis.result.total;
    assert_eq!(total.coding, 500);
    assert_eq!(total.watching, 1000);

    let chars = total.char_stats.expect("chat stats collected");
    assert_eq!((chars.prompt, chars.response), (123, 456));

    let language = &analysis.result.group_by.language;
    assert_eq!(language.get("terminal").unwrap().coding, 500);
    assert_eq!(language.get("chat").unwrap().watching, 1000);

    let terminal = &analysis.result.group_by.terminal;
    assert_eq!(terminal.get("cargo").unwrap().coding, 500);

    let vcs = &analysis.result.group_by.vcs;
    let pair = vcs.get("git:repo:main").unwrap();
    assert_eq!(pair.coding + pair.watching, 1500);

    assert!(analysis.warnings.is_empty());
}

#[test]
fn test_v3_records_aggregate() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "3.0\n\
             2 {} 1000 rust src/main.rs tracker pc1\n\
             0 {} 400 rust src/main.rs tracker pc1\n",
            TS,
            TS + 1000
        ),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::PROJECT | group_by::VCS);
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    assert_eq!(analysis.result.total.coding, 1000);
    assert_eq!(analysis.result.total.watching, 400);
    let pair = analysis.result.group_by.project.get("tracker").unwrap();
    assert_eq!((pair.coding, pair.watching), (1000, 400));
    // v3 lines carry no VCS context.
    assert!(analysis.result.group_by.vcs.contains_key("::"));
}

#[test]
fn test_unsupported_version_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_db(&dir, "20240720.db", "2.0\n2 0 100 rust a.rs proj pc\n");

    let err = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("unsupported version: 2.0"), "{message}");
    assert!(message.contains("20240720.db"), "{message}");
}

#[test]
fn test_empty_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_db(&dir, "20240720.db", "\n\n");

    let err = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap_err();
    assert!(err.to_string().contains("empty file"));
}

#[test]
fn test_too_few_columns_is_fatal_with_provenance() {
    let dir = TempDir::new().unwrap();
    write_db(&dir, "20240720.db", &format!("3.0\n2 {} 100\n", TS));

    let err = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("columns length is not valid"), "{message}");
    assert!(message.contains("20240720.db:2"), "{message}");
}

#[test]
fn test_too_many_columns_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\n2 {} 1000 rust a.rs proj pc extra\n", TS),
    );

    let analysis = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap();
    assert_eq!(analysis.result.total.coding, 1000);
    assert_eq!(analysis.warnings.len(), 1);
    let warning = &analysis.warnings[0];
    assert!(warning.message.contains("too many columns"));
    assert_eq!(warning.file, "20240720.db");
    assert_eq!(warning.line, Some(2));
}

#[test]
fn test_non_numeric_time_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_db(&dir, "20240720.db", "3.0\n2 soon 100 rust a.rs proj pc\n");

    let err = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap_err();
    assert!(err.to_string().contains("is not a number"));
}

#[test]
fn test_records_are_clipped_to_the_window() {
    let dir = TempDir::new().unwrap();
    // Starts one hour before the window, runs two hours.
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\n2 {} 7200000 rust a.rs proj pc\n", TS - 3_600_000),
    );

    let analysis = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap();
    assert_eq!(analysis.result.total.coding, 2000);
}

#[test]
fn test_out_of_window_records_are_excluded() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "3.0\n\
             2 {} 100 rust a.rs proj pc\n\
             2 {} 100 rust a.rs proj pc\n",
            TS - 10_000,
            TS + 10_000
        ),
    );

    let analysis = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap();
    assert_eq!(analysis.result.total.coding, 0);
    assert_eq!(analysis.result.total.watching, 0);
}

#[test]
fn test_whole_day_expansion_includes_the_whole_day() {
    let dir = TempDir::new().unwrap();
    // 01:00 of the same day, far outside the raw instant range.
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\n2 {} 1000 rust a.rs proj pc\n", DAY_START + 3_600_000),
    );

    let narrow = analyzer(&dir).analyze(TS, TS + 1000, false).unwrap();
    assert_eq!(narrow.result.total.coding, 0);

    let expanded = analyzer(&dir).analyze(TS, TS + 1000, true).unwrap();
    assert_eq!(expanded.result.total.coding, 1000);
}

#[test]
fn test_day_and_hour_buckets_split_across_midnight() {
    let dir = TempDir::new().unwrap();
    // 23:59:00, running two minutes into the next day.
    let start = DAY_START + 86_340_000;
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\n2 {} 120000 rust a.rs proj pc\n", start),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::DAY | group_by::HOUR);
    let analysis = analyzer.analyze(start, start + 120_000, false).unwrap();

    let day = &analysis.result.group_by.day;
    assert_eq!(day.get("20240720").unwrap().coding, 60_000);
    assert_eq!(day.get("20240721").unwrap().coding, 60_000);

    let hour = &analysis.result.group_by.hour;
    assert_eq!(hour.get("2024072023").unwrap().coding, 60_000);
    assert_eq!(hour.get("2024072100").unwrap().coding, 60_000);

    // Sub-bucket durations sum exactly to the total.
    let day_sum: i64 = day.values().map(|p| p.coding + p.watching).sum();
    assert_eq!(day_sum, analysis.result.total.coding);
}

#[test]
fn test_missing_files_are_tolerated() {
    let dir = TempDir::new().unwrap();
    // Three-day window, only the middle day has data.
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\n2 {} 1000 rust a.rs proj pc\n", TS),
    );

    let analysis = analyzer(&dir)
        .analyze(TS - 86_400_000, TS + 86_400_000, true)
        .unwrap();
    assert_eq!(analysis.result.total.coding, 1000);
}

#[test]
fn test_string_table_resolution() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "3.0\n\
             d!0=/very/long/project/path\n\
             2 {} 1000 rust a.rs !0 pc\n",
            TS
        ),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::PROJECT);
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    let project = &analysis.result.group_by.project;
    assert_eq!(project.get("/very/long/project/path").unwrap().coding, 1000);
    assert!(!project.contains_key("!0"));
}

#[test]
fn test_malformed_defining_line_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_db(&dir, "20240720.db", "3.0\nd=value\n");

    let err = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("defining line is invalid"), "{message}");
    assert!(message.contains("20240720.db:2"), "{message}");
}

#[test]
fn test_empty_resolved_value_buckets_under_unknown() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\ndp=\n2 {} 1000 rust a.rs p pc\n", TS),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::PROJECT);
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();
    assert_eq!(
        analysis.result.group_by.project.get("unknown").unwrap().coding,
        1000
    );
}

#[test]
fn test_filter_restricts_records() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "3.0\n\
             2 {} 1000 rust a.rs alpha pc\n\
             2 {} 500 rust b.rs beta pc\n",
            TS, TS
        ),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::PROJECT);
    analyzer.set_filter(FilterRules {
        project: Some(vec!["alpha".to_string()]),
        ..FilterRules::default()
    });
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    assert_eq!(analysis.result.total.coding, 1000);
    assert!(analysis.result.group_by.project.contains_key("alpha"));
    assert!(!analysis.result.group_by.project.contains_key("beta"));
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "3.0\n\
             # written by the collector\n\
             \n\
             2 {} 1000 rust a.rs proj pc\n",
            TS
        ),
    );

    let analysis = analyzer(&dir).analyze(TS, TS + 2000, false).unwrap();
    assert_eq!(analysis.result.total.coding, 1000);
    assert!(analysis.warnings.is_empty());
}

#[test]
fn test_malformed_chat_payload_counts_as_zero() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!("4.0\n4 {} 1000 chat - proj pc git repo main 0 0 broken\n", TS),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_chat_stats(true);
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    let chars = analysis.result.total.char_stats.expect("stats collected");
    assert_eq!((chars.prompt, chars.response), (0, 0));
    // The record's duration still aggregates normally.
    assert_eq!(analysis.result.total.watching, 1000);
}

#[test]
fn test_chat_stats_count_out_of_window_records() {
    let dir = TempDir::new().unwrap();
    // Chat record starting ten minutes after the window ends.
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "4.0\n4 {} 1000 chat - proj pc git repo main 0 0 123,456\n",
            TS + 602_000
        ),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_chat_stats(true);
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    // The duration is excluded, the character counts are not.
    assert_eq!(analysis.result.total.watching, 0);
    let chars = analysis.result.total.char_stats.expect("stats collected");
    assert_eq!((chars.prompt, chars.response), (123, 456));
}

#[test]
fn test_chat_stats_count_filtered_out_records() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!("4.0\n4 {} 1000 chat - beta pc git repo main 0 0 7,9\n", TS),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_chat_stats(true);
    analyzer.set_filter(FilterRules {
        project: Some(vec!["alpha".to_string()]),
        ..FilterRules::default()
    });
    let analysis = analyzer.analyze(TS, TS + 2000, false).unwrap();

    assert_eq!(analysis.result.total.watching, 0);
    let chars = analysis.result.total.char_stats.expect("stats collected");
    assert_eq!((chars.prompt, chars.response), (7, 9));
}

#[test]
fn test_analysis_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!(
            "4.0\n\
             2 {} 1000 rust a.rs proj pc git repo main 3 40\n\
             4 {} 500 chat - proj pc git repo main 0 0 12,34\n",
            TS,
            TS + 1000
        ),
    );

    let mut analyzer = analyzer(&dir);
    analyzer.set_group_by(group_by::ALL);
    analyzer.set_chat_stats(true);

    let first = analyzer.analyze(TS, TS + 2000, false).unwrap();
    let second = analyzer.analyze(TS, TS + 2000, false).unwrap();
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first.result).unwrap();
    let second_json = serde_json::to_string(&second.result).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn test_error_in_later_file_aborts_analysis() {
    let dir = TempDir::new().unwrap();
    write_db(
        &dir,
        "20240720.db",
        &format!("3.0\n2 {} 1000 rust a.rs proj pc\n", TS),
    );
    write_db(&dir, "20240721.db", "2.0\n");

    let err = analyzer(&dir)
        .analyze(TS, TS + 86_400_000, true)
        .unwrap_err();
    assert!(err.to_string().contains("unsupported version: 2.0"));
}
