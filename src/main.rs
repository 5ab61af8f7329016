//! Binary entrypoint for the armory CLI.
//!
//! Commands:
//! - `start` - run the HTTP server
//! - `init` - create a starter `config.toml`
//! - `status` - print store counts and exit
//! - `seed-items <file>` - bulk-load catalog items from a JSON file
//!
//! See the library crate docs for module-level details: `armory::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use armory::config::Config;
use armory::game::{GameError, GameStoreBuilder, ItemInput};

#[derive(Parser)]
#[command(name = "armory")]
#[command(about = "A game account and character economy backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Start,
    /// Initialize a new configuration file
    Init,
    /// Show store statistics
    Status,
    /// Bulk-load catalog items from a JSON array file
    SeedItems {
        /// Path to a JSON file of item definitions
        file: String,
    },
}

fn init_logging(config: &Config) {
    let level = config
        .logging
        .level
        .parse()
        .unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open_store(config: &Config) -> Result<armory::game::GameStore> {
    GameStoreBuilder::new(&config.storage.data_dir)
        .with_game_config(config.game.clone())
        .with_security_config(config.security.clone())
        .open()
        .context("failed to open game store")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Wrote default configuration to {}", cli.config);
            Ok(())
        }
        Commands::Start => {
            let config = Config::load(&cli.config).await?;
            init_logging(&config);
            armory::server::run(config).await
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&config);
            let store = open_store(&config)?;
            println!("data dir:   {}", config.storage.data_dir);
            println!("users:      {}", store.count_users());
            println!("characters: {}", store.count_characters());
            println!("items:      {}", store.count_items());
            Ok(())
        }
        Commands::SeedItems { file } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&config);
            let store = open_store(&config)?;
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read seed file {}", file))?;
            let items: Vec<ItemInput> = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse seed file {}", file))?;
            let mut seeded = 0usize;
            for item in items {
                let code = item.code;
                match store.put_item(item.into_record()) {
                    Ok(()) => seeded += 1,
                    Err(GameError::AlreadyExists(_)) => {
                        warn!("skipping item {}: code already in catalog", code);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            println!("Seeded {} items from {}", seeded, file);
            Ok(())
        }
    }
}
