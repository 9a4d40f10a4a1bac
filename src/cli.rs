//! Command-line interface for mediakeep.
//!
//! Provides commands for starting the bot and inspecting the resolved
//! configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::adapters;
use crate::config::{Config, Overrides};

/// mediakeep - Telegram media archiving bot
#[derive(Parser, Debug)]
#[command(name = "mediakeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bot (long polling until interrupted)
    Run {
        /// Bot token (or use TELEGRAM_TOKEN env)
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Directory for media and the catalog database
        #[arg(long, env = "MEDIAKEEP_HOME")]
        data_dir: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config {
        /// Directory for media and the catalog database
        #[arg(long, env = "MEDIAKEEP_HOME")]
        data_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run { token, data_dir } => {
                let config = Config::load(Overrides { token, data_dir })?;
                adapters::telegram::run(config).await
            }
            Commands::Config { data_dir } => {
                let config = Config::load(Overrides {
                    token: None,
                    data_dir,
                })?;
                execute_config(&config)
            }
        }
    }
}

/// Print the resolved configuration
fn execute_config(config: &Config) -> Result<()> {
    println!("mediakeep configuration:");
    println!("  Data dir:     {}", config.data_dir.display());
    println!("  Database:     {}", config.db_path.display());
    println!("  ffmpeg:       {}", config.ffmpeg_program);
    println!("  Detector:     {}", config.detector_program);
    println!("  Sample rate:  {} Hz", config.sample_rate);
    println!(
        "  Token:        {}",
        if config.token.is_some() {
            "set"
        } else {
            "not set (TELEGRAM_TOKEN)"
        }
    );

    Ok(())
}
