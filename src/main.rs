mod commands;
mod render;
mod utils;
mod view;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventos_core::config::Config;
use eventos_core::membership::Action;
use eventos_core::{EventId, UserId};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::view::Window;

#[derive(Parser)]
#[command(name = "eventos")]
#[command(about = "Browse your events and join or leave them")]
struct Cli {
    /// Act as this user (overrides config and EVENTOS_USER_ID)
    #[arg(short, long, global = true)]
    user: Option<i64>,

    /// Backend base URL (overrides config and EVENTOS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the events visible to you as a grid of cards
    Events {
        /// First grid row to show
        #[arg(long, default_value_t = 0)]
        scroll: u16,

        /// Number of grid rows to show (all by default)
        #[arg(long)]
        rows: Option<u16>,

        /// Width available to the grid (defaults to $COLUMNS)
        #[arg(long)]
        width: Option<u16>,
    },
    /// Join an event
    Join { event_id: i64 },
    /// Leave an event
    Leave { event_id: i64 },
    /// Show the configuration, creating a default file if there is none
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(id) = cli.user {
        config.user_id = Some(UserId(id));
    }

    init_tracing(&config.log_level);

    match cli.command {
        Commands::Events { scroll, rows, width } => {
            let user = require_user(&config)?;
            let width = width.unwrap_or_else(utils::tui::terminal_width);
            commands::events::run(&config, user, Window { scroll, rows }, width).await
        }
        Commands::Join { event_id } => {
            let user = require_user(&config)?;
            commands::toggle::run(&config, user, EventId(event_id), Action::Join).await
        }
        Commands::Leave { event_id } => {
            let user = require_user(&config)?;
            commands::toggle::run(&config, user, EventId(event_id), Action::Leave).await
        }
        Commands::Config => commands::config::run(&config),
    }
}

/// Log to stderr so output never interleaves with the grid on stdout.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn require_user(config: &Config) -> Result<UserId> {
    match config.user_id {
        Some(user) => Ok(user),
        None => {
            let path = Config::config_path()?;
            anyhow::bail!(
                "No user configured.\n\n\
                Pass one with:\n  \
                eventos --user <id> events\n\n\
                or add `user_id = <id>` to {}",
                path.display()
            );
        }
    }
}
