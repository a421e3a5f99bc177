use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use leadrank_store::ScoringConfigStore;

use super::open_config_store;
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged) and the active scoring config
    Show,
    /// Show configuration file and data paths
    Path,
    /// List retained scoring config versions
    History,
    /// Reactivate a retained scoring config version
    Rollback {
        /// Version number
        version: u32,
    },
}

pub async fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config().await,
        ConfigCommands::Path => show_paths(),
        ConfigCommands::History => show_history().await,
        ConfigCommands::Rollback { version } => rollback(version).await,
    }
}

async fn show_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("{}", toml::to_string_pretty(&config)?);

    let store = open_config_store(&config).await?;
    let scoring = store.current().await?;
    println!("{}", serde_json::to_string_pretty(&scoring)?);
    Ok(())
}

fn show_paths() -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("User config:    {}", ConfigLoader::user_config_path().display());
    println!("Project config: {}", ConfigLoader::project_config_path().display());
    println!("Data dir:       {}", config.data_dir().display());
    Ok(())
}

async fn show_history() -> Result<()> {
    let config = ConfigLoader::load()?;
    let store = open_config_store(&config).await?;
    let current = store.current().await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Version").fg(Color::Cyan),
        Cell::new("Updated").fg(Color::Cyan),
        Cell::new("Active").fg(Color::Cyan),
    ]);
    for entry in store.history().await? {
        let active = if entry.version == current.version { "*" } else { "" };
        table.add_row(vec![
            Cell::new(entry.version),
            Cell::new(entry.updated_at.to_rfc3339()),
            Cell::new(active),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn rollback(version: u32) -> Result<()> {
    let config = ConfigLoader::load()?;
    let store = open_config_store(&config).await?;
    match store.rollback(version).await? {
        Some(restored) => {
            println!("Rolled back to version {}", restored.version);
            Ok(())
        }
        None => anyhow::bail!("Version {} is not in the retained history", version),
    }
}
