//! Config command handler

use anyhow::Result;

use marquee_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config: &Config, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": Config::config_file_path(),
                    "data_dir": config.data_dir,
                    "database": config.sqlite_path(),
                    "table_name": config.table_name,
                    "log_level": config.log_level,
                })
            );
        }
        OutputFormat::Quiet => {
            if let Some(ref table) = config.table_name {
                println!("{}", table);
            }
        }
        OutputFormat::Human => {
            println!("Configuration");
            println!("=============");
            println!();
            println!("  Config file: {}", Config::config_file_path().display());
            println!("  Data dir:    {}", config.data_dir.display());
            println!("  Database:    {}", config.sqlite_path().display());
            println!(
                "  Table:       {}",
                config.table_name.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  Log level:   {}",
                config.log_level.as_deref().unwrap_or("(default)")
            );
        }
    }

    Ok(())
}
