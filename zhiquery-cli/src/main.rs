use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use num_format::{Locale, ToFormattedString};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing_subscriber::EnvFilter;
use zhiquery::{query, FilterKind, QueryConfig, Record, ResultSet};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    arg_required_else_help = true,
    after_help = filter_help()
)]
struct Cli {
    /// Directory holding the dataset files
    dataset_dir: Option<PathBuf>,

    /// Filter expression, e.g. [ State:CA and [ GrowthRate:5 or Price:400000 ] ]
    filter: Vec<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Dataset file extensions to include (e.g. csv,txt)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Dataset files to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Print accepted records as JSON
    #[arg(long)]
    json: bool,

    /// Show only totals, not records
    #[arg(short, long)]
    stats: bool,

    /// Drop records whose growth rate cannot be computed
    #[arg(long)]
    skip_non_finite: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn filter_help() -> String {
    let mut help = String::from("Kinds and Arguments:\n");
    for kind in FilterKind::ALL {
        help.push_str(&format!("  * {}: {}\n", kind, kind.argument_help()));
    }
    help.push_str("\nOperators `and` and `or` apply left to right; use [ ] to group.");
    help
}

impl Cli {
    fn into_config(self) -> QueryConfig {
        let defaults = QueryConfig::default();
        QueryConfig {
            dataset_dir: self.dataset_dir.unwrap_or(defaults.dataset_dir),
            filter: self.filter,
            file_extensions: self.extensions.map(|e| {
                e.split(',')
                    .map(|s| s.trim().to_string())
                    .collect::<Vec<_>>()
            }),
            ignore_patterns: self.ignore,
            stats_only: self.stats,
            json: self.json,
            skip_non_finite: self.skip_non_finite,
            thread_count: self.threads.unwrap_or(defaults.thread_count),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = QueryConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let config = file_config.merge_with_cli(cli.into_config());

    init_logging(&config.log_level);

    let result = query(&config)?;

    if config.stats_only {
        print_stats(&result);
    } else if config.json {
        println!("{}", serde_json::to_string_pretty(&result.records)?);
    } else {
        print_records(&result);
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn format_price(record: &Record) -> String {
    (record.latest_value() as i64).to_formatted_string(&Locale::en)
}

fn format_growth(rate: f64) -> String {
    let text = format!("{:.4}%", rate);
    if rate >= 0.0 {
        text.green().to_string()
    } else if rate < 0.0 {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}

fn print_records(result: &ResultSet) {
    for record in result.iter() {
        println!();
        println!("Dataset    : {}", record.dataset.blue());
        println!("Zip Code   : {}", record.zip_code);
        println!("City       : {}", record.city);
        println!("State      : {}", record.state);
        println!("County     : {}", record.county);
        println!("Growth Rate: {}", format_growth(record.growth_rate));
        println!("Years      : {}", record.years);
        println!("Price      : ${}", format_price(record));
        println!(
            "Google Map : https://www.google.com/maps/place/{}",
            record.zip_code
        );
    }

    println!("\nTotal zip codes: {}", result.len());
}

fn print_stats(result: &ResultSet) {
    println!("Total zip codes: {}", result.len());
    println!(
        "Scanned {} rows in {} datasets",
        result.rows_scanned, result.files_scanned
    );
}
