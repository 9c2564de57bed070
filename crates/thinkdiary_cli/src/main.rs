//! CLI smoke entry point.
//!
//! # Responsibility
//! - Connect to the configured document store, falling back to a local
//!   development database.
//! - Insert one sample tag and entry, read everything back, print a summary.

use clap::Parser;
use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thinkdiary_core::config::DEFAULT_CONFIG_FILE;
use thinkdiary_core::db::{open_db, DbError};
use thinkdiary_core::{
    create_sample_data, default_log_level, init_logging, validate_store, DiaryConfig,
    DiaryService, DocumentDiaryRepository, SqliteDocumentStore, StoreSummary,
};

const DEFAULT_FALLBACK_DB: &str = "thinkdiary-dev.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "thinkdiary")]
#[command(about = "ThinkDiary document store smoke test", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file with a `Store.DatabasePath` setting
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Database used when the configured store cannot be opened
    #[arg(long, default_value = DEFAULT_FALLBACK_DB)]
    fallback_db: PathBuf,

    /// Absolute directory for rolling log files (logging is off without it)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level, overrides `LogLevel` from the config file
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("ThinkDiary Store Smoke Tool");
    println!("===========================");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("To use this tool, ensure:");
            eprintln!(
                "1. `{}` is writable for the local development store",
                cli.fallback_db.display()
            );
            eprintln!(
                "2. Or configure a valid Store.DatabasePath in {}",
                cli.config.display()
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = match DiaryConfig::load(&cli.config) {
        Ok(config) => Some(config),
        Err(err) => {
            println!("Could not load from config: {err}");
            None
        }
    };

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .or_else(|| config.as_ref().and_then(|config| config.log_level.as_deref()))
            .unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    println!("Connecting to document store...");
    let conn = connect(config.as_ref(), &cli.fallback_db)?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    let service = DiaryService::new(DocumentDiaryRepository::new(store));
    println!("Connection successful!");

    let user_name = config.unwrap_or_default().user_name();
    println!("Hello, {user_name}!");

    println!();
    println!("Creating sample data...");
    let (tag, entry) = create_sample_data(&service)?;
    println!("Created tag: {}", tag.name);
    println!("Created entry: {}", entry.title);
    println!("Entry ID: {}", entry.id);
    println!("Word count: {}", entry.word_count);

    println!();
    println!("Validating store setup...");
    match validate_store(service.repository()) {
        Ok(summary) => {
            println!("✓ Store setup validation passed!");
            print_summary(&summary);
            Ok(())
        }
        Err(err) => {
            println!("✗ Store setup validation failed!");
            Err(err.into())
        }
    }
}

fn connect(config: Option<&DiaryConfig>, fallback: &Path) -> Result<Connection, DbError> {
    if let Some(config) = config {
        match config.database_path() {
            Ok(path) => match open_db(path) {
                Ok(conn) => return Ok(conn),
                Err(err) => println!("Could not open configured store: {err}"),
            },
            Err(err) => println!("Could not load from config: {err}"),
        }
    }

    warn!(
        "event=store_connect module=cli status=fallback path={}",
        fallback.display()
    );
    println!("Using local development store at {}...", fallback.display());
    open_db(fallback)
}

fn print_summary(summary: &StoreSummary) {
    println!();
    println!("=== Data Summary ===");
    println!("Total diary entries: {}", summary.entry_count);
    println!("Total tags: {}", summary.tag_count);

    if !summary.recent_entries.is_empty() {
        println!();
        println!("Recent entries:");
        for entry in &summary.recent_entries {
            println!(
                "- {} (Created: {})",
                entry.title,
                entry.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    if !summary.tags.is_empty() {
        println!();
        println!("Available tags:");
        for tag in &summary.tags {
            println!(
                "- {} ({})",
                tag.name,
                tag.color.as_deref().unwrap_or("No color")
            );
        }
    }
}
