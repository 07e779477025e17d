use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use shelfmerge_core::{AppConfig, NormalizedRecord, load_directory};
use shelfmerge_dedup::FuzzyMerger;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "shelfmerge",
    about = "Merge book-catalog exports into one deduplicated catalog",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SHELFMERGE_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every catalog file in a directory and merge duplicate books.
    Merge {
        /// Catalog directory (defaults to `ingest.directory` from config).
        dir: Option<PathBuf>,
        /// Write the merged catalog to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long)]
        title_threshold: Option<f64>,
        #[arg(long)]
        author_threshold: Option<f64>,
    },

    /// Show the normalized records before merging.
    Inspect {
        dir: Option<PathBuf>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the config file path.
    Path,
    /// Write a default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("SHELFMERGE_JSON").as_deref() == Ok("1");

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    match cli.command {
        Commands::Merge {
            dir,
            output,
            title_threshold,
            author_threshold,
        } => {
            if let Some(t) = title_threshold {
                config.merge.title_threshold = t;
            }
            if let Some(t) = author_threshold {
                config.merge.author_threshold = t;
            }
            let merger = FuzzyMerger::from_config(&config.merge)
                .context("invalid merge settings")?;

            let dir = dir.unwrap_or_else(|| config.ingest_directory());
            let records = load_records(&dir, &config)?;
            let outcome = merger.merge_with_stats(records);
            let stats = outcome.stats;

            info!(
                "Merged {} record(s) into {} book(s): {} prefix match(es), {} fuzzy match(es)",
                stats.input, stats.clusters, stats.prefix_matches, stats.fuzzy_matches
            );
            if stats.dropped > 0 {
                warn!("Dropped {} record(s) without a title", stats.dropped);
            }

            if let Some(path) = output {
                let body = serde_json::to_string_pretty(&outcome.records)?;
                std::fs::write(&path, body)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "output": path, "stats": stats },
                        "meta": { "duration_ms": dur }
                    }))?;
                } else {
                    println!("Wrote {} book(s) to {}", stats.clusters, path.display());
                }
            } else if json_output {
                let dur = start.elapsed().as_millis();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": outcome.records, "stats": stats },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("{}", serde_json::to_string_pretty(&outcome.records)?);
            }
        }

        Commands::Inspect { dir } => {
            let dir = dir.unwrap_or_else(|| config.ingest_directory());
            let records = load_records(&dir, &config)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": records, "total": records.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if records.is_empty() {
                println!("No records found in {}.", dir.display());
            } else {
                for record in &records {
                    print_record_line(record);
                }
                println!("{} record(s).", records.len());
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    println!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"path":config_path}}))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "config already exists at {} (use --force to overwrite)",
                        config_path.display()
                    );
                }
                AppConfig::default().save_to(&config_path)?;
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"path":config_path}}))?;
                } else {
                    println!("Wrote default config to {}", config_path.display());
                }
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfmerge=info,shelfmerge_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_records(dir: &Path, config: &AppConfig) -> Result<Vec<NormalizedRecord>> {
    load_directory(dir, &config.ingest)
        .with_context(|| format!("failed to load catalogs from {}", dir.display()))
}

fn print_record_line(record: &NormalizedRecord) {
    let title = record.title.as_deref().unwrap_or("<untitled>");
    let authors = record.author.join(", ");
    println!(
        "{source:<24}  {title:<40}  {authors}",
        source = record.source
    );
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
