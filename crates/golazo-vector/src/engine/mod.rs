//! Bridge to the out-of-process similarity engine.
//!
//! The engine speaks JSON over HTTP (`/health`, `/init`, `/insert`,
//! `/insert_batch`, `/search`, `/clear`, `/stats`). [`EngineClient`] owns the
//! connection state and, when it had to launch the engine itself, the child
//! process.

pub mod client;
pub mod process;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use golazo_core::error::GolazoError;

use crate::store::Metadata;

pub use client::EngineClient;
pub use process::EngineProcess;

/// Connection state of the engine client.
///
/// Disconnected -> Starting -> Connected on a successful launch,
/// Starting -> Disconnected when the launch fails, and
/// Connected -> Disconnected when a request fails at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No usable engine. Every request fails fast.
    Disconnected,
    /// A launched engine is being polled for health.
    Starting,
    /// The engine answered a health probe.
    Connected,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Disconnected => write!(f, "Disconnected"),
            EngineState::Starting => write!(f, "Starting"),
            EngineState::Connected => write!(f, "Connected"),
        }
    }
}

/// Failure of a single engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is not connected")]
    NotConnected,
    #[error("engine unreachable: {0}")]
    Unreachable(String),
    #[error("engine request timed out after {0:?}")]
    Timeout(Duration),
    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("engine rejected request: {0}")]
    Rejected(String),
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),
    #[error("engine startup failed: {0}")]
    Startup(String),
}

impl EngineError {
    /// Whether the failure means the engine itself is gone, as opposed to the
    /// engine answering with an error.
    pub fn is_transport(&self) -> bool {
        matches!(self, EngineError::Unreachable(_) | EngineError::Timeout(_))
    }

    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            EngineError::Timeout(timeout)
        } else if err.is_decode() {
            EngineError::InvalidResponse(err.to_string())
        } else {
            EngineError::Unreachable(err.to_string())
        }
    }
}

impl From<EngineError> for GolazoError {
    fn from(err: EngineError) -> Self {
        GolazoError::Engine(err.to_string())
    }
}

/// One vector as sent to `/insert` and `/insert_batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineItem {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// One hit from `/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineHit {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Value,
}
