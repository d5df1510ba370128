use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Competition a match belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    /// Campeonato Brasileiro Série A.
    Brasileirao,
    /// Copa do Brasil knockout cup.
    CopaDoBrasil,
    /// Copa Libertadores.
    Libertadores,
    #[default]
    Unknown,
}

impl Competition {
    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Competition::Brasileirao => "brasileirao",
            Competition::CopaDoBrasil => "copa_do_brasil",
            Competition::Libertadores => "libertadores",
            Competition::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// A single match as produced by the ingestion layer.
///
/// Team names are expected to be normalized already (no state suffixes).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub match_date: Option<NaiveDateTime>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_team_state: Option<String>,
    #[serde(default)]
    pub away_team_state: Option<String>,
    #[serde(default)]
    pub home_goals: u32,
    #[serde(default)]
    pub away_goals: u32,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub match_round: Option<u32>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub competition: Competition,
    #[serde(default)]
    pub venue: Option<String>,
}

/// A FIFA player record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub overall: u32,
    #[serde(default)]
    pub potential: u32,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub preferred_foot: Option<String>,
}
