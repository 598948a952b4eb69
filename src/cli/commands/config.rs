//! Config command - show or validate configuration

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::args::{ConfigArgs, ConfigFormat};
use crate::config::{
    Config, EXAMPLE_CONFIG, config_search_paths, load_config, resolve_config_path,
};

/// Execute the config command
pub async fn execute(args: ConfigArgs, config_path: Option<PathBuf>) -> Result<()> {
    if args.paths {
        println!("Config search paths (in priority order):");
        for (i, cp) in config_search_paths().iter().enumerate() {
            let exists = if cp.path.is_file() {
                "\x1b[32m[exists]\x1b[0m"
            } else {
                ""
            };
            println!("  {}. {} {}", i + 1, cp.description, exists);
            println!("     {}", cp.path.display());
        }
        return Ok(());
    }

    if args.example {
        match args.format {
            ConfigFormat::Json => {
                let config = Config::from_toml(EXAMPLE_CONFIG)
                    .context("Failed to parse example config")?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigFormat::Toml => print!("{}", EXAMPLE_CONFIG),
        }
        return Ok(());
    }

    let path = resolve_config_path(config_path.as_deref())?;
    let config_file = load_config(&path)?;

    if args.validate {
        let expanded = config_file
            .config
            .expand()
            .with_context(|| format!("Configuration file is invalid: {}", path.display()))?;
        println!("Configuration file is valid: {}", path.display());
        for socket in &expanded.sockets {
            println!(
                "  {} -> {} ({} upstream{})",
                socket.name,
                socket.path.display(),
                socket.upstreams.len(),
                if socket.upstreams.len() == 1 { "" } else { "s" }
            );
        }
        return Ok(());
    }

    match args.format {
        ConfigFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config_file.config)?);
        }
        ConfigFormat::Toml => {
            println!("# Configuration from: {}", path.display());
            println!();
            print!("{}", toml::to_string_pretty(&config_file.config)?);
        }
    }

    Ok(())
}
