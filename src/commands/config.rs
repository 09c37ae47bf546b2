use std::process::ExitCode;

use anyhow::{Context, Result};
use eventos_core::config::Config;
use owo_colors::OwoColorize;

pub fn run(config: &Config) -> Result<ExitCode> {
    let path = Config::config_path()?;

    if path.exists() {
        println!("{}", path.display().dimmed());
    } else {
        Config::create_default_config(&path)?;
        println!("{} {}", "Created".green(), path.display());
    }

    let effective = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!();
    print!("{effective}");

    Ok(ExitCode::SUCCESS)
}
