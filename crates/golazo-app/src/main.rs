//! Golazo application binary - composition root.
//!
//! 1. Load configuration from TOML and apply CLI / env overrides
//! 2. Open the vector store (embedder + optional external engine)
//! 3. Run one subcommand: index, search or status

mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::de::DeserializeOwned;
use serde_json::json;

use golazo_core::config::GolazoConfig;
use golazo_core::error::{GolazoError, Result};
use golazo_core::types::{Match, Player};
use golazo_vector::{MatchFilter, PlayerFilter, StoreConfig, VectorStore};

use cli::{CliArgs, Command, RecordKind};

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| {
        GolazoError::Config(format!("cannot open {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

async fn run_index(
    store: &mut VectorStore,
    matches: Option<PathBuf>,
    players: Option<PathBuf>,
    out: &Path,
) -> Result<()> {
    if matches.is_none() && players.is_none() {
        return Err(GolazoError::Config(
            "nothing to index: pass --matches and/or --players".to_string(),
        ));
    }

    if let Some(path) = matches {
        let records: Vec<Match> = read_records(&path)?;
        tracing::info!(path = %path.display(), count = records.len(), "Matches read");
        store.index_matches(&records).await?;
    }
    if let Some(path) = players {
        let records: Vec<Player> = read_records(&path)?;
        tracing::info!(path = %path.display(), count = records.len(), "Players read");
        store.index_players(&records).await?;
    }

    store.save(out)?;
    println!("Indexed {} records into {}", store.len(), out.display());
    Ok(())
}

async fn run_search(
    store: &mut VectorStore,
    query: &str,
    limit: usize,
    kind: Option<RecordKind>,
    match_filter: MatchFilter,
    player_filter: PlayerFilter,
) -> Result<()> {
    let results: Vec<serde_json::Value> = match kind {
        Some(RecordKind::Match) => store
            .search_matches(query, limit, &match_filter)
            .await?
            .into_iter()
            .map(serde_json::Value::Object)
            .collect(),
        Some(RecordKind::Player) => store
            .search_players(query, limit, &player_filter)
            .await?
            .into_iter()
            .map(serde_json::Value::Object)
            .collect(),
        None => store
            .search(query, limit)
            .await?
            .into_iter()
            .map(|hit| {
                json!({
                    "id": hit.entry.id,
                    "score": hit.score,
                    "text": hit.entry.text,
                    "metadata": hit.entry.metadata,
                })
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn run_status(store: &mut VectorStore) -> Result<()> {
    println!("engine: {}", store.engine_state());
    match store.engine_health().await {
        Ok(()) => println!("health: ok"),
        Err(e) => println!("health: {}", e),
    }
    println!("embedder: {} ({} dimensions)", store.embedder().kind(), store.dimension());
    if store.using_engine() {
        match store.engine_stats().await {
            Ok(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
            Err(e) => tracing::warn!(error = %e, "Engine stats unavailable"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = GolazoConfig::load_or_default(&config_file);
    config.engine.port = args.resolve_engine_port(config.engine.port);
    if args.no_engine {
        config.engine.enabled = false;
    }

    // Tracing: --log-level > RUST_LOG > config.
    let filter = match args.resolve_log_level() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting golazo v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let data_dir = resolve_data_dir(&config.general.data_dir);
    let default_limit = config.search.default_limit;
    let mut store = VectorStore::open(StoreConfig::from(&config)).await;

    let outcome = match args.command {
        Command::Index {
            matches,
            players,
            out,
        } => {
            let out = out.unwrap_or_else(|| data_dir.clone());
            run_index(&mut store, matches, players, &out).await
        }
        Command::Search {
            query,
            store: dir,
            limit,
            kind,
            competition,
            season,
            nationality,
            min_overall,
        } => {
            let dir = dir.unwrap_or_else(|| data_dir.clone());
            let match_filter = MatchFilter {
                competition,
                season,
            };
            let player_filter = PlayerFilter {
                nationality,
                min_overall,
            };
            async {
                store.load(&dir).await?;
                run_search(
                    &mut store,
                    &query,
                    limit.unwrap_or(default_limit),
                    kind,
                    match_filter,
                    player_filter,
                )
                .await
            }
            .await
        }
        Command::Status => run_status(&mut store).await,
    };

    // Stop a launched engine before reporting any error.
    store.shutdown().await;

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Command failed");
        return Err(e.into());
    }
    Ok(())
}
