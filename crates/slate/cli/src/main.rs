//! slatectl - replay swipe sessions against the slate decision engine
//!
//! - `run`: load a billet feed, hydrate the user's persisted ledgers, replay
//!   a scripted session, flush, and print the resulting slate and manifest
//! - `show`: print what storage currently holds for a user
//! - `config`: print the effective configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use slate_engine::{AssignmentStore, PromotionRejection, SlateEvent, StaticBilletSource};
use slate_types::{Billet, UserId};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod output;
mod script;

use config::CliConfig;
use output::{OutputFormat, SessionReport};

/// Slate CLI application.
#[derive(Parser)]
#[command(name = "slatectl")]
#[command(about = "Slate - billet swipe decisions and ranked applications", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long, env = "SLATE_CONFIG")]
    config: Option<String>,

    /// Sailor the session belongs to.
    #[arg(short, long, env = "SLATE_USER", default_value = "sailor")]
    user: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Log level (overrides the configured level).
    #[arg(long, env = "SLATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging.
    #[arg(long, env = "SLATE_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted swipe session.
    Run {
        /// JSON array of billets.
        #[arg(short, long)]
        billets: PathBuf,

        /// JSON array of actions.
        #[arg(short, long)]
        script: PathBuf,
    },

    /// Show the persisted slate and manifest.
    Show {
        /// JSON array of billets.
        #[arg(short, long)]
        billets: PathBuf,
    },

    /// Show configuration.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let user_id = UserId::new(cli.user.clone());

    match cli.command {
        Commands::Run { billets, script } => {
            let actions = script::parse(
                &std::fs::read_to_string(&script)
                    .with_context(|| format!("reading {}", script.display()))?,
            )
            .with_context(|| format!("parsing {}", script.display()))?;

            let mut store = open_store(&config, &billets, &user_id).await?;
            let mut events = store.subscribe();

            let steps = script::run(&mut store, &actions, &user_id).await;
            store.flush().await.context("flushing to storage")?;

            loop {
                match events.try_recv() {
                    Ok(SlateEvent::PromotionDenied {
                        billet_id,
                        reason: PromotionRejection::SlateFull,
                    }) => output::print_warning(&format!(
                        "Slate full: {} added to manifest instead",
                        billet_id
                    )),
                    Ok(SlateEvent::PersistFailed { key, reason }) => {
                        output::print_warning(&format!("Could not persist {}: {}", key, reason))
                    }
                    Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                    Err(_) => break,
                }
            }

            let report = SessionReport::capture(&store, &user_id, steps);
            output::print_report(&report, cli.output)
        }
        Commands::Show { billets } => {
            let store = open_store(&config, &billets, &user_id).await?;
            let report = SessionReport::capture(&store, &user_id, Vec::new());
            output::print_report(&report, cli.output)
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn open_store(
    config: &CliConfig,
    billets: &Path,
    user_id: &UserId,
) -> anyhow::Result<AssignmentStore> {
    let feed: Vec<Billet> = serde_json::from_str(
        &std::fs::read_to_string(billets)
            .with_context(|| format!("reading {}", billets.display()))?,
    )
    .with_context(|| format!("parsing {}", billets.display()))?;

    let mut store = AssignmentStore::with_storage(config.engine.clone(), config.storage.build());
    store
        .fetch_billets(&StaticBilletSource::new(feed), user_id)
        .await?;
    store.hydrate(user_id).await.context("hydrating from storage")?;
    Ok(store)
}
