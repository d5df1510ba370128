//! Domain adapters: turn matches and players into searchable documents.
//!
//! Each record becomes a short description plus a flat metadata object with
//! a `type` tag, so typed searches can filter on it.

use serde_json::{json, Value};
use tracing::info;

use golazo_core::error::Result;
use golazo_core::types::{Competition, Match, Player};

use crate::store::{Metadata, VectorStore};

pub const MATCH_TYPE: &str = "match";
pub const PLAYER_TYPE: &str = "player";

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter for [`VectorStore::search_matches`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilter {
    pub competition: Option<Competition>,
    pub season: Option<i32>,
}

impl MatchFilter {
    pub fn accepts(&self, metadata: &Metadata) -> bool {
        if metadata.get("type").and_then(Value::as_str) != Some(MATCH_TYPE) {
            return false;
        }
        if let Some(competition) = self.competition {
            if metadata.get("competition").and_then(Value::as_str) != Some(competition.as_str()) {
                return false;
            }
        }
        if let Some(season) = self.season {
            if metadata.get("season").and_then(Value::as_i64) != Some(i64::from(season)) {
                return false;
            }
        }
        true
    }
}

/// Filter for [`VectorStore::search_players`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    /// Case-insensitive substring of the player's nationality.
    pub nationality: Option<String>,
    pub min_overall: Option<u32>,
}

impl PlayerFilter {
    pub fn accepts(&self, metadata: &Metadata) -> bool {
        if metadata.get("type").and_then(Value::as_str) != Some(PLAYER_TYPE) {
            return false;
        }
        if let Some(wanted) = self.nationality.as_deref().filter(|n| !n.is_empty()) {
            let nationality = metadata
                .get("nationality")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            if !nationality.contains(&wanted.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_overall {
            let overall = metadata.get("overall").and_then(Value::as_u64).unwrap_or(0);
            if overall < u64::from(min) {
                return false;
            }
        }
        true
    }
}

/// Description text for a match, skipping absent parts.
pub fn match_text(m: &Match) -> String {
    let mut parts = vec![
        format!("{} vs {}", m.home_team, m.away_team),
        format!("score {}-{}", m.home_goals, m.away_goals),
        m.competition.to_string(),
    ];
    if let Some(season) = m.season {
        parts.push(format!("season {}", season));
    }
    if let Some(round) = m.match_round {
        parts.push(format!("round {}", round));
    }
    if let Some(date) = m.match_date {
        parts.push(date.format(DATE_FORMAT).to_string());
    }
    parts.join(", ")
}

pub fn match_metadata(m: &Match) -> Metadata {
    into_metadata(json!({
        "type": MATCH_TYPE,
        "home_team": &m.home_team,
        "away_team": &m.away_team,
        "home_goals": m.home_goals,
        "away_goals": m.away_goals,
        "competition": m.competition.as_str(),
        "season": m.season,
        "round": m.match_round,
        "datetime": m.match_date.map(|d| d.format(DATETIME_FORMAT).to_string()),
    }))
}

/// Description text for a player, skipping absent parts.
pub fn player_text(p: &Player) -> String {
    let mut parts = vec![p.name.clone()];
    parts.extend(
        [&p.nationality, &p.position, &p.club]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .cloned(),
    );
    parts.push(format!("overall {}", p.overall));
    parts.join(", ")
}

pub fn player_metadata(p: &Player) -> Metadata {
    into_metadata(json!({
        "type": PLAYER_TYPE,
        "id": p.id,
        "name": &p.name,
        "nationality": &p.nationality,
        "position": &p.position,
        "club": &p.club,
        "overall": p.overall,
        "potential": p.potential,
    }))
}

fn into_metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

impl VectorStore {
    /// Index matches as `match_<position>` documents.
    pub async fn index_matches(&mut self, matches: &[Match]) -> Result<()> {
        let documents = matches
            .iter()
            .enumerate()
            .map(|(i, m)| (format!("match_{}", i), match_text(m), match_metadata(m)))
            .collect();
        self.add_batch(documents).await?;
        info!(count = matches.len(), "Indexed matches");
        Ok(())
    }

    /// Index players as `player_<id>` documents.
    pub async fn index_players(&mut self, players: &[Player]) -> Result<()> {
        let documents = players
            .iter()
            .map(|p| (format!("player_{}", p.id), player_text(p), player_metadata(p)))
            .collect();
        self.add_batch(documents).await?;
        info!(count = players.len(), "Indexed players");
        Ok(())
    }

    /// Match metadata for the `k` best matches passing `filter`.
    pub async fn search_matches(
        &mut self,
        query: &str,
        k: usize,
        filter: &MatchFilter,
    ) -> Result<Vec<Metadata>> {
        let hits = self.search_filtered(query, k, |m| filter.accepts(m)).await?;
        Ok(hits.into_iter().map(|hit| hit.entry.metadata).collect())
    }

    /// Player metadata for the `k` best players passing `filter`.
    pub async fn search_players(
        &mut self,
        query: &str,
        k: usize,
        filter: &PlayerFilter,
    ) -> Result<Vec<Metadata>> {
        let hits = self.search_filtered(query, k, |m| filter.accepts(m)).await?;
        Ok(hits.into_iter().map(|hit| hit.entry.metadata).collect())
    }
}
