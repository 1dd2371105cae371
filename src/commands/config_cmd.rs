use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::render::OutputFormat;

const DEFAULT_CONFIG: &str = r#"# foodmenu configuration

# Realtime database URL (required)
# database_url: https://my-app-default-rtdb.firebaseio.com

# Collection holding the food records (default: food)
collection: food

# Prefix shown before prices (default: $)
currency_symbol: "$"

# How long list/show wait for more events before printing, in milliseconds.
# The wait starts after the first event arrives.
# idle_timeout_ms: 2000

# How long to wait for the collection's first event, in milliseconds
# first_event_timeout_ms: 10000
"#;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                cli_config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!(
                            "database_url: {}",
                            config
                                .database_url
                                .value
                                .as_deref()
                                .unwrap_or("(not set)")
                        );
                        println!("  source: {}", config.database_url.source);
                        println!();

                        println!("collection: {}", config.collection.value);
                        println!("  source: {}", config.collection.source);
                        println!();

                        println!("currency_symbol: {}", config.currency_symbol.value);
                        println!("  source: {}", config.currency_symbol.source);
                        println!();

                        println!("idle_timeout_ms: {}", config.idle_timeout_ms.value);
                        println!("  source: {}", config.idle_timeout_ms.source);
                        println!();

                        println!(
                            "first_event_timeout_ms: {}",
                            config.first_event_timeout_ms.value
                        );
                        println!("  source: {}", config.first_event_timeout_ms.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);
                if write_default_config(&config_path)? {
                    println!("Created config file: {}", config_path.display());
                    println!("\nSet database_url in this file before using 'foodmenu food'.");
                } else {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'foodmenu config show' to view current configuration.");
                }
                Ok(())
            }
        }
    }
}

/// Writes the commented default config. Returns false if the file exists.
fn write_default_config(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(DEFAULT_CONFIG.as_bytes())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        assert!(write_default_config(&path).unwrap());
        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.collection.value, "food");
        assert_eq!(config.collection.source, ConfigSource::File);
        assert_eq!(config.database_url.value, None);

        // Second run leaves the file alone.
        assert!(!write_default_config(&path).unwrap());
    }
}
