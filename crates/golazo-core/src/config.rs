use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GolazoError, Result};

/// Top-level configuration for Golazo.
///
/// Loaded from `~/.golazo/config.toml` by default. Every section falls back
/// to its defaults when omitted, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GolazoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl GolazoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GolazoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GolazoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the persisted vector store.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.golazo/store".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Text embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Vector dimension used by the hashing embedder.
    pub dimension: usize,
    /// Name of the pretrained sentence-transformer, for logging.
    pub model_name: String,
    /// Directory with `model.onnx` and `tokenizer.json`. When unset the
    /// hashing embedder is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            model_name: "all-MiniLM-L6-v2".to_string(),
            model_dir: None,
        }
    }
}

/// External similarity engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether to use the external engine at all.
    pub enabled: bool,
    /// Engine host name.
    pub host: String,
    /// Engine HTTP port. Also passed to a launched engine as its first argument.
    pub port: u16,
    /// Launch the engine when the health probe fails.
    pub auto_start: bool,
    /// Timeout for `/health` probes in milliseconds.
    pub health_timeout_ms: u64,
    /// Timeout for every other request in milliseconds.
    pub request_timeout_ms: u64,
    /// Health polls after launching the engine.
    pub startup_poll_attempts: u32,
    /// Delay between health polls in milliseconds.
    pub startup_poll_interval_ms: u64,
    /// Program used to run the launcher script (e.g. `node`). When empty the
    /// launcher is executed directly.
    pub launcher_interpreter: String,
    /// Candidate launcher locations, tried in order. A launcher script must
    /// `exec` the engine so that stopping the child stops the engine.
    pub launcher_candidates: Vec<String>,
}

impl EngineConfig {
    /// Base URL of the engine, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn startup_poll_interval(&self) -> Duration {
        Duration::from_millis(self.startup_poll_interval_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            port: 3456,
            auto_start: true,
            health_timeout_ms: 2_000,
            request_timeout_ms: 30_000,
            startup_poll_attempts: 10,
            startup_poll_interval_ms: 500,
            launcher_interpreter: "node".to_string(),
            launcher_candidates: vec![
                "ruvector_server.js".to_string(),
                "engine/ruvector_server.js".to_string(),
            ],
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default number of results.
    pub default_limit: usize,
    /// Candidates requested from the engine per wanted result, so that
    /// metadata filtering still leaves enough hits.
    pub overfetch_factor: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            overfetch_factor: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = GolazoConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.embedding.dimension, 384);
        assert!(config.embedding.model_dir.is_none());
        assert!(config.engine.enabled);
        assert!(config.engine.auto_start);
        assert_eq!(config.engine.port, 3456);
        assert_eq!(config.engine.health_timeout(), Duration::from_secs(2));
        assert_eq!(config.engine.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.engine.startup_poll_attempts, 10);
        assert_eq!(
            config.engine.startup_poll_interval(),
            Duration::from_millis(500)
        );
        assert_eq!(config.search.overfetch_factor, 2);
    }

    #[test]
    fn test_base_url() {
        let engine = EngineConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(engine.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[engine]
port = 4000
auto_start = false
"#;
        let file = create_temp_config(content);
        let config = GolazoConfig::load(file.path()).unwrap();
        assert_eq!(config.engine.port, 4000);
        assert!(!config.engine.auto_start);
        assert_eq!(config.engine.host, "localhost");
        assert_eq!(config.embedding.dimension, 384);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
[general]
data_dir = "/tmp/golazo"
log_level = "debug"

[embedding]
dimension = 128
model_name = "custom"
model_dir = "/models/minilm"

[engine]
enabled = false
host = "engine.local"
port = 7000
auto_start = false
health_timeout_ms = 100
request_timeout_ms = 1000
startup_poll_attempts = 3
startup_poll_interval_ms = 50
launcher_interpreter = "deno"
launcher_candidates = ["/opt/engine/server.js"]

[search]
default_limit = 25
overfetch_factor = 4
"#;
        let file = create_temp_config(content);
        let config = GolazoConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/tmp/golazo");
        assert_eq!(config.embedding.dimension, 128);
        assert_eq!(config.embedding.model_dir.as_deref(), Some("/models/minilm"));
        assert!(!config.engine.enabled);
        assert_eq!(config.engine.base_url(), "http://engine.local:7000");
        assert_eq!(config.engine.startup_poll_attempts, 3);
        assert_eq!(config.engine.launcher_interpreter, "deno");
        assert_eq!(config.engine.launcher_candidates, vec!["/opt/engine/server.js"]);
        assert_eq!(config.search.default_limit, 25);
        assert_eq!(config.search.overfetch_factor, 4);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = GolazoConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.golazo/store");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        assert!(GolazoConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = GolazoConfig::load(file.path()).unwrap();
        assert_eq!(config.engine.port, 3456);
        assert_eq!(config.search.default_limit, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut config = GolazoConfig::default();
        config.engine.launcher_interpreter = String::new();
        config.save(&path).unwrap();

        let reloaded = GolazoConfig::load(&path).unwrap();
        assert_eq!(reloaded.engine.port, config.engine.port);
        assert!(reloaded.engine.launcher_interpreter.is_empty());
        assert_eq!(reloaded.embedding.dimension, config.embedding.dimension);
    }
}
