//! Marquee CLI
//!
//! Command-line transport for Marquee. Each movie subcommand is one
//! entrypoint: it builds a request, runs the handler, prints the response
//! and exits non-zero unless the status is 200.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use marquee_core::{Config, DalError, MovieTable};

mod commands;
mod output;

use output::{Output, OutputFormat};

/// Log level when neither RUST_LOG nor the config sets one
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Marquee - movies keyed by year and title")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a movie by year and title slug
    Get {
        /// Release year
        year: String,
        /// Title slug (words separated by '-' or '+')
        title: String,
    },
    /// List movies released in a year
    #[command(alias = "ls")]
    List {
        /// Release year
        year: String,
    },
    /// Create a movie (replaces an existing one with the same key)
    #[command(alias = "add")]
    Create {
        /// Movie JSON (read from stdin if not provided)
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Update plot and rating of an existing movie
    Update {
        /// Movie JSON (read from stdin if not provided)
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Delete a movie by year and title slug
    #[command(alias = "rm")]
    Delete {
        /// Release year
        year: String,
        /// Title slug (words separated by '-' or '+')
        title: String,
    },
    /// Create the configured table
    Provision,
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config);

    let table = MovieTable::new(config);

    let response = match cli.command {
        Commands::Get { year, title } => commands::movie::get(&table, year, title),
        Commands::List { year } => commands::movie::list(&table, year),
        Commands::Create { body } => commands::movie::create(&table, body)?,
        Commands::Update { body } => commands::movie::update(&table, body)?,
        Commands::Delete { year, title } => commands::movie::delete(&table, year, title),
        Commands::Provision => {
            if let Err(e) = commands::provision::provision(&table, &output) {
                print_hint(&e, &output);
                return Err(e);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config { command } => {
            match command {
                Some(ConfigCommands::Show) | None => {
                    commands::config::show(table.config(), &output)?
                }
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    output.print_response(&response);
    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Install a stderr subscriber; RUST_LOG takes precedence over the config
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        EnvFilter::new(format!("marquee_core={},marquee_cli={}", level, level))
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print a recovery suggestion for storage errors
fn print_hint(error: &anyhow::Error, output: &Output) {
    if output.is_quiet() || output.is_json() {
        return;
    }
    let hint = error
        .chain()
        .find_map(|cause| match cause.downcast_ref::<DalError>() {
            Some(DalError::Store(e)) => e.recovery_suggestion(),
            _ => None,
        });
    if let Some(hint) = hint {
        eprintln!("hint: {}", hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from(["marquee", "get", "1994", "Pulp-Fiction"]).unwrap();
        match cli.command {
            Commands::Get { year, title } => {
                assert_eq!(year, "1994");
                assert_eq!(title, "Pulp-Fiction");
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_parse_create_with_body() {
        let cli =
            Cli::try_parse_from(["marquee", "--json", "add", "--body", "{}"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Create { body: Some(ref b) } if b == "{}"));
    }

    #[test]
    fn test_parse_update_from_stdin() {
        let cli = Cli::try_parse_from(["marquee", "update"]).unwrap();
        assert!(matches!(cli.command, Commands::Update { body: None }));
    }
}
