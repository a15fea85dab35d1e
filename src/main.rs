use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use coding_tracker::analyzer::Analyzer;
use coding_tracker::calendar;
use coding_tracker::config::get_config;
use coding_tracker::display::DisplayManager;
use coding_tracker::filter::FilterRules;
use coding_tracker::logging::init_logging;
use coding_tracker::schema::group_by;

#[derive(Parser)]
#[command(name = "coding-tracker")]
#[command(about = "Analyze coding-activity tracking databases")]
#[command(version = "1.0.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a date range and report coding/watching time
    Report {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Start date (YYYY-MM-DD, default today)
        #[arg(long)]
        since: Option<String>,
        /// End date (YYYY-MM-DD, default today)
        #[arg(long)]
        until: Option<String>,
        /// Dimensions to group by (comma-separated:
        /// computer,project,file,language,terminal,vcs,hour,day or "all")
        #[arg(long, default_value = "project,language")]
        group_by: String,
        /// Only include these projects
        #[arg(long)]
        project: Vec<String>,
        /// Only include these computers
        #[arg(long)]
        computer: Vec<String>,
        /// Only include these languages
        #[arg(long)]
        language: Vec<String>,
        /// Only include these files
        #[arg(long)]
        file: Vec<String>,
        /// Also collect chat prompt/response character counts
        #[arg(long)]
        chat_stats: bool,
        /// Database directory (default from configuration)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Analyze the exact given instants instead of whole days
        #[arg(long)]
        no_expand: bool,
    },
}

fn main() -> Result<()> {
    // Keeps the file appender flushing until the process ends.
    let _log_guard = init_logging();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Report {
        json: false,
        since: None,
        until: None,
        group_by: "project,language".to_string(),
        project: Vec::new(),
        computer: Vec::new(),
        language: Vec::new(),
        file: Vec::new(),
        chat_stats: false,
        data_dir: None,
        no_expand: false,
    });

    match command {
        Commands::Report {
            json,
            since,
            until,
            group_by,
            project,
            computer,
            language,
            file,
            chat_stats,
            data_dir,
            no_expand,
        } => {
            let today = Local::now().date_naive();
            let since_date = parse_date_arg(since, today, json);
            let until_date = parse_date_arg(until, today, json);
            let start_ms = calendar::to_timestamp(&Local, since_date.and_time(NaiveTime::MIN));
            let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
            let end_ms = calendar::to_timestamp(&Local, until_date.and_time(end_of_day));

            let data_dir =
                data_dir.unwrap_or_else(|| get_config().paths.data_directory.clone());
            let mut analyzer = Analyzer::new(data_dir);
            analyzer.set_group_by(parse_group_by(&group_by, json));
            analyzer.set_chat_stats(chat_stats);
            analyzer.set_filter(FilterRules {
                project: non_empty(project),
                computer: non_empty(computer),
                language: non_empty(language),
                file: non_empty(file),
                ..FilterRules::default()
            });

            match analyzer.analyze(start_ms, end_ms, !no_expand) {
                Ok(analysis) => {
                    DisplayManager::from_config(&get_config().output)
                        .display_report(&analysis, json);
                    Ok(())
                }
                Err(e) => handle_error(e, json),
            }
        }
    }
}

fn parse_date_arg(arg: Option<String>, default: NaiveDate, json: bool) -> NaiveDate {
    let Some(text) = arg else {
        return default;
    };
    match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            if !json {
                eprintln!("Invalid date format: {}. Use YYYY-MM-DD", text);
            }
            process::exit(1);
        }
    }
}

fn parse_group_by(arg: &str, json: bool) -> u32 {
    let mut flags = 0;
    for name in arg.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        flags |= match name {
            "all" => group_by::ALL,
            "computer" => group_by::COMPUTER,
            "project" => group_by::PROJECT,
            "file" => group_by::FILE,
            "language" => group_by::LANGUAGE,
            "terminal" => group_by::TERMINAL,
            "vcs" => group_by::VCS,
            "hour" => group_by::HOUR,
            "day" => group_by::DAY,
            other => {
                if !json {
                    eprintln!("Unknown group-by dimension: {}", other);
                }
                process::exit(1);
            }
        };
    }
    flags
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{{\"error\": \"{}\"}}", e);
    } else {
        eprintln!("Error: {}", e);
    }
    process::exit(1);
}
