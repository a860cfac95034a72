//! Configuration command handlers

use anyhow::{bail, Result};

use noteshare_core::Config;

use crate::output::Output;
use crate::ConfigCommands;

/// Dispatch `config` subcommands; bare `config` shows the current values
pub fn run(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => show(output),
        Some(ConfigCommands::Set { key, value }) => set(key, value, output),
    }
}

/// Show current configuration
fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("data_dir   = {}", config.data_dir.display());
        println!("upload_dir = {}", config.upload_dir().display());
        println!("database   = {}", config.sqlite_path().display());
        println!();
        println!("config file: {}", Config::config_file_path().display());
    }

    Ok(())
}

/// Set a configuration value and save the config file
fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load()?;

    match key.as_str() {
        "data_dir" => config.data_dir = value.clone().into(),
        "upload_dir" => {
            config.upload_dir = if value.is_empty() {
                None
            } else {
                Some(value.clone().into())
            }
        }
        _ => bail!(
            "Unknown configuration key: {} (expected data_dir or upload_dir)",
            key
        ),
    }

    config.save()?;
    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}
