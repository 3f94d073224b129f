//! Mediashift CLI: run migrations, offload uploads, probe the object store, report progress.
//!
//! `migrate` and `status` read DATABASE_URL and the OFFLOAD_* settings; `test` and
//! `offload` need only the OFFLOAD_* settings.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediashift_cli::{
    format_batch_summary, format_scheduler_run, format_status, init_tracing,
    offload_config_from_env,
};
use mediashift_core::{AppConfig, AppError, MigrationConfig};
use mediashift_db::PostgresCatalog;
use mediashift_services::{
    catalog_statistics, ConnectivityProbe, MigrationEngine, MigrationScheduler, UploadOffloader,
};
use mediashift_storage::create_object_store;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mediashift", about = "Move local media to object storage")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate local files to the object store
    Migrate {
        /// Report what would be migrated without touching anything
        #[arg(long)]
        dry_run: bool,
        /// Maximum number of items to examine
        #[arg(long)]
        limit: Option<u32>,
        /// Run configured-size batches until the catalog converges
        #[arg(long, conflicts_with_all = ["dry_run", "limit"])]
        batched: bool,
    },
    /// Move a freshly uploaded file to the object store and print its stored location
    Offload {
        /// Path of the uploaded file
        path: PathBuf,
    },
    /// Check connectivity to the configured bucket
    Test,
    /// Show migration progress
    Status,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Validated offload settings, or `None` after reporting why they are unusable.
fn require_offload(config: Result<MigrationConfig, AppError>) -> Option<MigrationConfig> {
    match config {
        Ok(migration) => Some(migration),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate {
            dry_run,
            limit,
            batched,
        } => {
            let config = AppConfig::from_env().context("Failed to load configuration")?;
            let Some(migration) = require_offload(config.migration()) else {
                return Ok(ExitCode::FAILURE);
            };
            let pool = mediashift_db::connect(&config).await?;
            let catalog = Arc::new(PostgresCatalog::new(
                pool,
                config.media_type(),
                config.remote_marker(),
            ));
            let store = create_object_store(&migration).context("Create object store")?;
            let batch_size = migration.batch_size;
            let engine = Arc::new(MigrationEngine::new(
                Arc::new(migration),
                catalog.clone(),
                catalog,
                store,
            ));

            if batched {
                let scheduler = MigrationScheduler::new(engine, batch_size, Duration::ZERO);
                let run = scheduler.run_until_converged().await?;
                if cli.json {
                    print_json(&serde_json::json!({
                        "batches": run.batches,
                        "migrated": run.migrated,
                        "examined": run.examined,
                        "errors": run.errors,
                    }))?;
                } else {
                    print!("{}", format_scheduler_run(&run));
                }
            } else {
                let result = engine.migrate_all(dry_run, limit).await?;
                if cli.json {
                    print_json(&result)?;
                } else {
                    print!("{}", format_batch_summary(&result, dry_run));
                }
            }
        }
        Commands::Offload { path } => {
            let Some(migration) = require_offload(offload_config_from_env()) else {
                return Ok(ExitCode::FAILURE);
            };
            let store = create_object_store(&migration).context("Create object store")?;
            let location = UploadOffloader::new(Arc::new(migration), store)
                .offload_upload(&path)
                .await;
            if cli.json {
                print_json(&serde_json::json!({
                    "location": location.stored_location(),
                    "remote": location.is_remote(),
                }))?;
            } else {
                println!("{}", location.stored_location());
            }
            if !location.is_remote() {
                eprintln!("File kept on local storage");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Test => {
            let Some(migration) = require_offload(offload_config_from_env()) else {
                return Ok(ExitCode::FAILURE);
            };
            let store = create_object_store(&migration).context("Create object store")?;
            let report = ConnectivityProbe::new(Arc::new(migration), store)
                .probe()
                .await;
            if cli.json {
                print_json(&report)?;
            } else if report.success {
                println!("{}", report.message);
            } else {
                eprintln!("{}", report.message);
            }
            if !report.success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Status => {
            let config = AppConfig::from_env().context("Failed to load configuration")?;
            let configured = config.offload.is_configured();
            let pool = mediashift_db::connect(&config).await?;
            let catalog =
                PostgresCatalog::new(pool, config.media_type(), config.remote_marker());
            let stats = catalog_statistics(&catalog).await?;
            if cli.json {
                print_json(&serde_json::json!({
                    "total": stats.total,
                    "local": stats.local,
                    "remote": stats.remote,
                    "percentage": stats.percentage,
                    "configured": configured,
                }))?;
            } else {
                print!("{}", format_status(&stats, configured));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
