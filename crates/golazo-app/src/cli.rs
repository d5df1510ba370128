//! CLI argument definitions for the golazo binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use golazo_core::types::Competition;

/// Golazo - semantic search over Brazilian soccer matches and players.
#[derive(Parser, Debug)]
#[command(name = "golazo", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Port of the external similarity engine.
    #[arg(long = "engine-port", global = true)]
    pub engine_port: Option<u16>,

    /// Skip the external engine and search locally only.
    #[arg(long = "no-engine", global = true)]
    pub no_engine: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Build a store from match and player JSON files and save it.
    Index {
        /// JSON array of matches.
        #[arg(long)]
        matches: Option<PathBuf>,
        /// JSON array of players.
        #[arg(long)]
        players: Option<PathBuf>,
        /// Output directory. Defaults to the configured data directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Search a saved store.
    Search {
        query: String,
        /// Store directory. Defaults to the configured data directory.
        #[arg(long)]
        store: Option<PathBuf>,
        /// Maximum number of results.
        #[arg(short = 'k', long = "limit")]
        limit: Option<usize>,
        /// Restrict results to one record kind.
        #[arg(long, value_enum)]
        kind: Option<RecordKind>,
        /// Match competition (brasileirao, copa_do_brasil, libertadores).
        #[arg(long, value_parser = parse_competition)]
        competition: Option<Competition>,
        /// Match season.
        #[arg(long)]
        season: Option<i32>,
        /// Player nationality, matched case-insensitively as a substring.
        #[arg(long)]
        nationality: Option<String>,
        /// Minimum player overall rating.
        #[arg(long)]
        min_overall: Option<u32>,
    },
    /// Report engine connectivity and statistics.
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Match,
    Player,
}

fn parse_competition(value: &str) -> Result<Competition, String> {
    match value.to_lowercase().replace('-', "_").as_str() {
        "brasileirao" => Ok(Competition::Brasileirao),
        "copa_do_brasil" => Ok(Competition::CopaDoBrasil),
        "libertadores" => Ok(Competition::Libertadores),
        other => Err(format!("unknown competition '{}'", other)),
    }
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > GOLAZO_CONFIG env var > ~/.golazo/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("GOLAZO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the engine port.
    ///
    /// Priority: --engine-port flag > GOLAZO_ENGINE_PORT env var > config file value.
    pub fn resolve_engine_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.engine_port {
            return p;
        }
        if let Ok(val) = std::env::var("GOLAZO_ENGINE_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the log level. Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".golazo").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".golazo").join("config.toml");
    }
    PathBuf::from("config.toml")
}
