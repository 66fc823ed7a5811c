mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weighbridge_core::{
    load_config, validate_config, Config, SqliteTicketStore, StoreTicketRepository,
    TicketRepository, TicketStore,
};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "weighbridge.toml";

/// Record and manage weighbridge tickets.
#[derive(Debug, Parser)]
#[command(name = "weighbridge", version)]
struct Cli {
    /// Configuration file (TOML). Defaults to ./weighbridge.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record a new ticket.
    Add {
        #[command(flatten)]
        fields: commands::TicketFields,
    },

    /// Change fields of an existing ticket. Omitted fields keep their value.
    Edit {
        id: i64,

        #[command(flatten)]
        fields: commands::TicketFields,
    },

    /// List tickets, optionally filtered by a driver name or licence prefix.
    List {
        /// Driver name or licence number prefix.
        #[arg(long, short)]
        query: Option<String>,

        /// Newest tickets first.
        #[arg(long)]
        desc: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one ticket.
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Delete a ticket.
    Delete { id: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    // Logs go to stderr so command output stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Database path: {:?}", config.database.path);

    let store: Arc<dyn TicketStore> = Arc::new(
        SqliteTicketStore::new(&config.database.path).context("Failed to open ticket store")?,
    );
    let repository: Arc<dyn TicketRepository> = Arc::new(StoreTicketRepository::new(store));

    match cli.command {
        Command::Add { fields } => commands::save(repository, &config, None, fields).await,
        Command::Edit { id, fields } => {
            commands::save(repository, &config, Some(id), fields).await
        }
        Command::List { query, desc, json } => {
            commands::list(repository, &config, query, desc, json).await
        }
        Command::Show { id, json } => commands::show(repository, id, json).await,
        Command::Delete { id } => commands::delete(repository, &config, id).await,
    }
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                load_config(default)
                    .with_context(|| format!("Failed to load config from {:?}", default))
            } else {
                Ok(Config::default())
            }
        }
    }
}
