// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog CLI - Terminal front end

mod commands;
mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rick-catalog", version, about = "Browse catalog characters, episodes and favorites")]
struct Cli {
    /// Override the catalog API base URL for this run
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding settings.json and defaults.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Keep favorites and settings in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List characters
    List {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show a character and its episodes
    Show { id: u32 },
    /// Show a single episode
    Episode { id: u32 },
    /// List favorite characters
    Favorites,
    /// Add or remove a character from favorites
    Favorite { id: u32 },
    /// Show settings, or change and save them
    Config {
        /// New catalog API base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Connect timeout in seconds
        #[arg(long)]
        connect_timeout: Option<u64>,
        /// Whole-request timeout in seconds (0 for none)
        #[arg(long)]
        request_timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rick_catalog_cli=info".parse()?)
                .add_directive("rick_catalog_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Rick Catalog CLI v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let state = state::AppState::new(state::StateOptions {
        api_url: cli.api_url,
        config_dir: cli.config_dir,
        ephemeral: cli.ephemeral,
    })?;

    match cli.command {
        Command::List { page } => commands::list(&state, page).await,
        Command::Show { id } => commands::show(&state, id).await,
        Command::Episode { id } => commands::episode(&state, id).await,
        Command::Favorites => commands::favorites(&state),
        Command::Favorite { id } => commands::toggle_favorite(&state, id).await,
        Command::Config {
            base_url,
            connect_timeout,
            request_timeout,
        } => commands::config(&state, base_url, connect_timeout, request_timeout),
    }
}
