//! oxide-deploy CLI
//!
//! Command-line tool for deploying changelogs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_deploy::prelude::*;
use oxide_deploy::steps::{
    CLEANUP_REPORT, DIFF_OUTPUT_CONTROL, HISTORY, LOCK_STATUS, UPDATE_REPORT, UPDATE_SQL,
};

/// Lock-guarded, exactly-once database change deployment.
#[derive(Parser)]
#[command(name = "oxide-deploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL. Overrides the configuration file.
    #[arg(short, long, env = "DATABASE_URL")]
    url: Option<String>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Milliseconds to wait for the deployment lock.
    #[arg(long, env = "OXIDE_LOCK_TIMEOUT_MS")]
    lock_timeout_ms: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending change sets.
    Update {
        /// Changelog to apply.
        #[arg(short = 'f', long)]
        changelog_file: PathBuf,
    },

    /// Print the SQL update would run.
    UpdateSql {
        /// Changelog to render.
        #[arg(short = 'f', long)]
        changelog_file: PathBuf,
    },

    /// List applied change sets.
    History,

    /// Clear the deployment lock.
    ReleaseLocks,

    /// Drop tables and the ledger.
    DropAll {
        /// Tables to drop before the ledger (name or schema.name).
        #[arg(long, value_delimiter = ',')]
        objects: Vec<String>,
    },

    /// Build diff output settings.
    DiffOutputControl {
        /// Schemas to compare (name or reference:comparison).
        #[arg(long, value_delimiter = ',')]
        schemas: Vec<String>,

        /// Qualify objects with their catalog.
        #[arg(long)]
        include_catalog: bool,

        /// Qualify objects with their schema.
        #[arg(long)]
        include_schema: bool,

        /// Include tablespace clauses.
        #[arg(long)]
        include_tablespace: bool,

        /// Drop explicit NULL values from generated changes.
        #[arg(long)]
        drop_null_values: bool,
    },
}

impl Commands {
    /// Maps the subcommand onto a pipeline command and its arguments.
    fn pipeline_arguments(&self) -> (&'static str, BTreeMap<String, String>) {
        let mut args = BTreeMap::new();
        let name = match self {
            Self::Update { changelog_file } => {
                args.insert("changelogFile".into(), changelog_file.display().to_string());
                "update"
            }
            Self::UpdateSql { changelog_file } => {
                args.insert("changelogFile".into(), changelog_file.display().to_string());
                "updateSql"
            }
            Self::History => "history",
            Self::ReleaseLocks => "releaseLocks",
            Self::DropAll { objects } => {
                args.insert("objects".into(), objects.join(","));
                "dropAll"
            }
            Self::DiffOutputControl {
                schemas,
                include_catalog,
                include_schema,
                include_tablespace,
                drop_null_values,
            } => {
                args.insert("schemas".into(), schemas.join(","));
                args.insert("includeCatalog".into(), include_catalog.to_string());
                args.insert("includeSchema".into(), include_schema.to_string());
                args.insert("includeTablespace".into(), include_tablespace.to_string());
                args.insert("preserveNullValues".into(), (!drop_null_values).to_string());
                "diffOutputControl"
            }
        };
        (name, args)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => DeployConfig::from_json_file(path)?,
        None => DeployConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.url.clone_from(url);
    }
    if let Some(timeout) = cli.lock_timeout_ms {
        config.lock_timeout_ms = timeout;
    }

    let ctx = DeployContext::standard(config);
    let registry = CommandRegistry::standard();
    let (command, arguments) = cli.command.pipeline_arguments();

    let results = registry
        .run(&ctx, command, &arguments, PipelineResults::new())
        .await?;
    print_results(&results)?;
    Ok(())
}

fn print_results(results: &PipelineResults) -> anyhow::Result<()> {
    if let Some(report) = results.get(UPDATE_REPORT)? {
        for id in &report.already_applied {
            info!("Already applied: {id}");
        }
        for id in &report.applied {
            info!("Applied: {id}");
        }
        info!(
            "{} change set(s) applied, {} statement(s) executed on {}",
            report.applied.len(),
            report.statements,
            report.target
        );
    }

    if let Some(sql) = results.get(UPDATE_SQL)? {
        for statement in sql {
            println!("{statement};");
        }
    }

    if let Some(history) = results.get(HISTORY)? {
        if history.is_empty() {
            info!("No change sets applied");
        }
        for row in history {
            println!(
                "{:>4}  {}  {}  {}",
                row.order_executed,
                row.date_executed.format("%Y-%m-%d %H:%M:%S"),
                row.identity(),
                row.checksum
            );
        }
    }

    if let Some(status) = results.get(LOCK_STATUS)? {
        info!("Lock released (locked: {})", status.locked);
    }

    if let Some(report) = results.get(CLEANUP_REPORT)? {
        for table in &report.dropped {
            info!("Dropped {table}");
        }
        for table in &report.absent {
            info!("Already absent: {table}");
        }
    }

    if let Some(control) = results.get(DIFF_OUTPUT_CONTROL)? {
        println!("{control:#?}");
    }

    Ok(())
}
