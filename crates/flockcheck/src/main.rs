// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flockcheck - resumable poultry health data collection over Telegram.
//!
//! This is the binary entry point.

mod check;
mod serve;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flockcheck - resumable poultry health data collection over Telegram.
#[derive(Parser, Debug)]
#[command(name = "flockcheck", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot.
    Serve,
    /// Validate configuration, open storage and report adapter health.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => flockcheck_config::load_and_validate_path(path),
        None => flockcheck_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            flockcheck_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Check { plain }) => check::run_check(&config, plain).await,
        None => {
            println!("flockcheck: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("flockcheck: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_global_config_flag() {
        let cli = Cli::parse_from(["flockcheck", "check", "--plain", "--config", "/tmp/f.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/f.toml")));
        assert!(matches!(cli.command, Some(Commands::Check { plain: true })));
    }

    #[test]
    fn cli_accepts_no_subcommand() {
        let cli = Cli::parse_from(["flockcheck"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }
}
