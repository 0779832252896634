//! Statera command-line interface.
//!
//! Usage:
//!   statera report --start 2025-01-01 --end 2025-03-31 --category all
//!   statera report ... --ledger ledger.json      - Read entries from a JSON file
//!   statera import --ledger ledger.json          - Load JSON entries into the database
//!   statera validate --mapping mapping.json      - Check a mapping definition
//!
//! Without `--ledger`, reports read from the database in `STATERA__DATABASE__URL`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use statera_core::ledger::{InMemoryLedger, LedgerAggregator};
use statera_core::mapping::MappingDefinition;
use statera_core::reports::{FinancialReport, ReportCategory, StatementService};
use statera_db::{DatabaseConnection, LedgerRepository, connect};
use statera_shared::{AppConfig, AppError, AppResult};

/// Generate financial statements from a categorized ledger.
#[derive(Parser, Debug)]
#[command(name = "statera")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Mapping definition (overrides `mapping.path` from config)
    #[arg(short, long, global = true, value_name = "FILE")]
    mapping: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a report
    Report {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// income_statement, balance_sheet, cash_flow or all
        #[arg(long, default_value = "all")]
        category: ReportCategory,
        /// Read ledger entries from a JSON file instead of the database
        #[arg(long, value_name = "FILE")]
        ledger: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Load ledger entries from a JSON file into the database
    Import {
        /// JSON array of ledger entries
        #[arg(long, value_name = "FILE")]
        ledger: PathBuf,
    },
    /// Validate the mapping definition and exit
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statera=info,statera_core=info,statera_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::load().context("failed to load configuration")?;

    let mapping_path = args
        .mapping
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.mapping.path));

    match args.command {
        Command::Report {
            start,
            end,
            category,
            ledger,
            pretty,
        } => {
            let definition = load_mapping(&mapping_path)?;
            let aggregator = open_ledger(ledger, &config).await?;
            let service = StatementService::new(Arc::new(definition), aggregator)
                .with_max_concurrent_queries(config.engine.max_concurrent_queries);

            let report = generate(&service, start, end, category)
                .await
                .inspect_err(|err| {
                    error!(
                        code = err.error_code(),
                        client_error = err.is_client_error(),
                        "Report generation failed"
                    );
                })?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
        }
        Command::Import { ledger } => {
            let entries = InMemoryLedger::from_path(&ledger)?;
            let repo = LedgerRepository::new(database(&config).await?);
            let written = repo.insert_entries(entries.entries()).await?;
            info!(written, file = %ledger.display(), "Imported ledger entries");
        }
        Command::Validate => {
            let definition = load_mapping(&mapping_path)?;
            info!(
                version = %definition.version,
                path = %mapping_path.display(),
                "Mapping definition is valid"
            );
        }
    }

    Ok(())
}

fn load_mapping(path: &Path) -> Result<MappingDefinition> {
    MappingDefinition::load(path)
        .map_err(AppError::from)
        .inspect_err(|err| error!(code = err.error_code(), "Mapping definition rejected"))
        .with_context(|| format!("invalid mapping definition {}", path.display()))
}

async fn generate(
    service: &StatementService,
    start: NaiveDate,
    end: NaiveDate,
    category: ReportCategory,
) -> AppResult<FinancialReport> {
    Ok(service.generate(start, end, category).await?)
}

async fn open_ledger(
    ledger: Option<PathBuf>,
    config: &AppConfig,
) -> Result<Arc<dyn LedgerAggregator>> {
    if let Some(path) = ledger {
        let ledger = InMemoryLedger::from_path(&path)?;
        info!(entries = ledger.len(), file = %path.display(), "Loaded ledger file");
        return Ok(Arc::new(ledger));
    }

    Ok(Arc::new(LedgerRepository::new(database(config).await?)))
}

async fn database(config: &AppConfig) -> Result<DatabaseConnection> {
    let Some(database) = &config.database else {
        bail!("no ledger source: pass --ledger or set STATERA__DATABASE__URL");
    };
    let db = connect(database).await?;
    info!("Connected to database");
    Ok(db)
}
