//! Almanac CLI - keeps a local mirror of the EVE ESI market catalog.

mod commands;
mod config;
mod progress;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::shared::SyncArgs;

#[derive(Parser)]
#[command(name = "almanac")]
#[command(version)]
#[command(about = "A durable local mirror of the EVE ESI market catalog")]
#[command(
    long_about = "Almanac caches EVE Online market group definitions and item names from \
ESI in a local database. Only missing records are fetched, in bounded concurrent rounds \
that respect ESI's error budget. Once the market groups are fully synced, later runs are \
served from the cache without touching the network."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync market groups and print them:
        $ almanac groups

    Resolve item names, showing the first 20:
        $ almanac names --limit 20

    Inspect the local cache without any network calls:
        $ almanac status --json

CONFIGURATION
    Almanac reads configuration from:
      1. ~/.config/almanac/config.toml (or $XDG_CONFIG_HOME/almanac/config.toml)
      2. ./almanac.toml
      3. Environment variables (ALMANAC_* prefix, nested keys joined with "__")
      4. .env file in current directory

ENVIRONMENT VARIABLES
    ALMANAC_DATABASE_URL              Database connection string (default: ~/.local/state/almanac/almanac.db)
    ALMANAC_ESI__BASE_URL             ESI base URL (default: https://esi.evetech.net/latest)
    ALMANAC_ESI__COMPONENT_NAME       Component name sent in the User-Agent
    ALMANAC_ESI__CONTACT              Contact (email or URL) sent in the User-Agent
    ALMANAC_ESI__REQUESTS_PER_SECOND  Proactive pacing (off by default)
    ALMANAC_SYNC__GROUP_CONCURRENCY   Market group requests per round (default: 10)
    ALMANAC_SYNC__NAME_CONCURRENCY    Name lookups per round (default: 10)
    ALMANAC_SYNC__NAME_PAGE_SIZE      Ids per name lookup, at most 1000 (default: 1000)
    RUST_LOG                          Log filter (default: almanac=info,almanac_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every market group definition
    Groups {
        #[command(flatten)]
        sync_opts: SyncArgs,
    },
    /// Resolve names for every item type referenced by a market group
    Names {
        /// Only print the first N names (by id)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[command(flatten)]
        sync_opts: SyncArgs,
    },
    /// Show what is cached locally (no network calls)
    Status {
        /// Print status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("almanac=info,almanac_cli=info"),
    };

    // Logs go to stderr so command output on stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; records fetched so far are already saved");
            ExitCode::from(130)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL; set ALMANAC_DATABASE_URL")?;

    ensure_sqlite_parent_dir(&database_url)?;

    match cli.command {
        Commands::Groups { sync_opts } => {
            commands::groups::handle_groups(sync_opts, &config, &database_url).await?;
        }
        Commands::Names { limit, sync_opts } => {
            commands::names::handle_names(sync_opts, limit, &config, &database_url).await?;
        }
        Commands::Status { json } => {
            commands::status::handle_status(json, &database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
    }

    Ok(())
}

/// Create the directory holding a file-backed SQLite database.
fn ensure_sqlite_parent_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    let db_path = std::path::Path::new(db_path);

    // Warn if using a relative path (can cause issues depending on cwd)
    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
