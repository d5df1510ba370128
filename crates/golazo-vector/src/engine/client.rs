//! HTTP client for the similarity engine.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use golazo_core::config::EngineConfig;

use super::{EngineError, EngineHit, EngineItem, EngineProcess, EngineState};

#[derive(Serialize)]
struct InitRequest {
    dimension: usize,
}

#[derive(Serialize)]
struct InsertBatchRequest<'a> {
    items: &'a [EngineItem],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    k: usize,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Deserialize)]
struct AckResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    results: Vec<EngineHit>,
    #[serde(default)]
    error: Option<String>,
}

fn rejected(error: Option<String>) -> EngineError {
    EngineError::Rejected(error.unwrap_or_else(|| "unknown error".to_string()))
}

/// Client for one engine endpoint.
///
/// Requests are only sent while [`EngineState::Connected`]; otherwise they
/// fail with [`EngineError::NotConnected`] without touching the network.
/// A transport failure while connected moves the client to
/// [`EngineState::Disconnected`]; only an explicit
/// [`EngineClient::ensure_available`] call probes the engine again.
#[derive(Debug)]
pub struct EngineClient {
    config: EngineConfig,
    base_url: String,
    http: reqwest::Client,
    state: EngineState,
    startup_attempted: bool,
    process: Option<EngineProcess>,
}

impl EngineClient {
    /// Create a disconnected client. No network traffic happens here.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| EngineError::Unreachable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url(),
            config,
            http,
            state: EngineState::Disconnected,
            startup_attempted: false,
            process: None,
        })
    }

    /// Create a client and bring the engine up if possible.
    pub async fn connect(config: EngineConfig) -> Result<Self, EngineError> {
        let mut client = Self::new(config)?;
        client.ensure_available().await;
        Ok(client)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == EngineState::Connected
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether this client launched the engine process it talks to.
    pub fn owns_process(&self) -> bool {
        self.process.is_some()
    }

    /// Probe the engine and, if it is down and auto-start is enabled, launch
    /// it once. Returns the resulting state.
    pub async fn ensure_available(&mut self) -> EngineState {
        if self.state == EngineState::Connected {
            return self.state;
        }

        if self.probe().await {
            info!(url = %self.base_url, "Connected to engine");
            self.state = EngineState::Connected;
            return self.state;
        }

        if !self.config.auto_start {
            warn!(url = %self.base_url, "Engine unreachable and auto-start disabled");
            self.state = EngineState::Disconnected;
            return self.state;
        }

        if self.startup_attempted {
            debug!("Engine startup already attempted, staying disconnected");
            return self.state;
        }

        self.startup_attempted = true;
        self.state = EngineState::Starting;
        match self.start_engine().await {
            Ok(()) => {
                info!(url = %self.base_url, "Launched engine is healthy");
                self.state = EngineState::Connected;
            }
            Err(e) => {
                warn!(error = %e, "Engine startup failed, using local index");
                self.state = EngineState::Disconnected;
            }
        }
        self.state
    }

    /// Check `/health` once. Does not change the connection state.
    pub async fn health(&self) -> Result<(), EngineError> {
        let timeout = self.config.health_timeout();
        let response = self
            .http
            .get(self.endpoint("/health"))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            return Err(EngineError::Status {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        if health.status == "ok" {
            Ok(())
        } else {
            Err(EngineError::Rejected(format!(
                "health status {}",
                health.status
            )))
        }
    }

    async fn probe(&self) -> bool {
        match self.health().await {
            Ok(()) => true,
            Err(e) => {
                debug!(url = %self.base_url, error = %e, "Engine health probe failed");
                false
            }
        }
    }

    /// Create the engine's index for vectors of `dimension` floats.
    pub async fn init(&mut self, dimension: usize) -> Result<(), EngineError> {
        self.require_connected()?;
        let request = self
            .http
            .post(self.endpoint("/init"))
            .json(&InitRequest { dimension });
        self.execute_ack(request).await
    }

    pub async fn insert(&mut self, item: &EngineItem) -> Result<(), EngineError> {
        self.require_connected()?;
        let request = self.http.post(self.endpoint("/insert")).json(item);
        self.execute_ack(request).await
    }

    pub async fn insert_batch(&mut self, items: &[EngineItem]) -> Result<(), EngineError> {
        self.require_connected()?;
        let request = self
            .http
            .post(self.endpoint("/insert_batch"))
            .json(&InsertBatchRequest { items });
        self.execute_ack(request).await
    }

    /// Up to `k` nearest neighbours of `vector`, in the engine's order.
    pub async fn search(&mut self, vector: &[f32], k: usize) -> Result<Vec<EngineHit>, EngineError> {
        self.require_connected()?;
        let request = self
            .http
            .post(self.endpoint("/search"))
            .json(&SearchRequest { vector, k });
        let response: SearchResponse = self.execute(request).await?;
        if response.success == Some(false) {
            return Err(rejected(response.error));
        }
        Ok(response.results)
    }

    pub async fn clear(&mut self) -> Result<(), EngineError> {
        self.require_connected()?;
        let request = self.http.post(self.endpoint("/clear"));
        self.execute_ack(request).await
    }

    /// Engine statistics, passed through as JSON.
    pub async fn stats(&mut self) -> Result<Value, EngineError> {
        self.require_connected()?;
        let request = self.http.get(self.endpoint("/stats"));
        self.execute(request).await
    }

    /// Stop a launched engine and disconnect.
    pub async fn shutdown(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.stop().await;
        }
        self.state = EngineState::Disconnected;
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn require_connected(&self) -> Result<(), EngineError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(EngineError::NotConnected)
        }
    }

    async fn execute_ack(&mut self, request: RequestBuilder) -> Result<(), EngineError> {
        let body = self.send(request).await?;
        // Any 2xx body that is not a JSON ack object counts as success.
        match serde_json::from_slice::<AckResponse>(&body) {
            Ok(ack) if ack.success == Some(false) => Err(rejected(ack.error)),
            _ => Ok(()),
        }
    }

    async fn execute<R: DeserializeOwned>(&mut self, request: RequestBuilder) -> Result<R, EngineError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }

    /// Send with the request timeout and return the body of a 2xx response.
    async fn send(&mut self, request: RequestBuilder) -> Result<Vec<u8>, EngineError> {
        let timeout = self.config.request_timeout();
        let result = Self::send_inner(request.timeout(timeout), timeout).await;

        if let Err(e) = &result {
            if e.is_transport() {
                warn!(url = %self.base_url, error = %e, "Lost engine connection");
                self.state = EngineState::Disconnected;
            } else {
                debug!(error = %e, "Engine request failed");
            }
        }
        result
    }

    async fn send_inner(request: RequestBuilder, timeout: Duration) -> Result<Vec<u8>, EngineError> {
        let response = request
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest(e, timeout))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| EngineError::from_reqwest(e, timeout))?;

        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }

    /// Launch the first launcher candidate that exists and poll it for health.
    async fn start_engine(&mut self) -> Result<(), EngineError> {
        let launcher = self.find_launcher().ok_or_else(|| {
            EngineError::Startup(format!(
                "no launcher found among {:?}",
                self.config.launcher_candidates
            ))
        })?;

        let mut process = EngineProcess::spawn(
            &self.config.launcher_interpreter,
            &launcher,
            self.config.port,
        )?;

        let attempts = self.config.startup_poll_attempts;
        for attempt in 1..=attempts {
            tokio::time::sleep(self.config.startup_poll_interval()).await;

            if process.has_exited() {
                return Err(EngineError::Startup(
                    "engine process exited during startup".to_string(),
                ));
            }
            if self.probe().await {
                debug!(attempt, "Engine became healthy");
                self.process = Some(process);
                return Ok(());
            }
        }

        process.stop().await;
        Err(EngineError::Startup(format!(
            "engine not healthy after {} polls",
            attempts
        )))
    }

    fn find_launcher(&self) -> Option<PathBuf> {
        self.config
            .launcher_candidates
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }
}
