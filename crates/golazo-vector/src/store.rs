//! The vector store: local entries, a lazily rebuilt similarity matrix, and an
//! optional external engine kept in sync by dual writes.
//!
//! Searches go to the engine while it is connected and fall back to the
//! local matrix whenever the engine fails or returns nothing.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use golazo_core::config::{EmbeddingConfig, EngineConfig, GolazoConfig, SearchConfig};
use golazo_core::error::{GolazoError, Result};

use crate::embedding::Embedder;
use crate::engine::{EngineClient, EngineItem, EngineState};
use crate::index::LocalIndex;
use crate::persist::{self, PersistedRecord, METADATA_FILE, VECTORS_FILE};

/// Free-form JSON object attached to every entry.
pub type Metadata = serde_json::Map<String, Value>;

/// One stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
    pub text: String,
}

impl VectorEntry {
    fn to_engine_item(&self) -> EngineItem {
        EngineItem {
            id: self.id.clone(),
            vector: self.vector.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// A search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub entry: VectorEntry,
    /// Cosine similarity locally, the engine's score on the engine path.
    pub score: f64,
}

/// Everything the store needs from the application config.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub embedding: EmbeddingConfig,
    pub engine: EngineConfig,
    pub search: SearchConfig,
}

impl From<&GolazoConfig> for StoreConfig {
    fn from(config: &GolazoConfig) -> Self {
        Self {
            embedding: config.embedding.clone(),
            engine: config.engine.clone(),
            search: config.search.clone(),
        }
    }
}

/// Vector store with engine-first search and local fallback.
///
/// Entries are append-only between [`clear`](Self::clear) and
/// [`load`](Self::load). An id added twice is kept twice; on the engine path
/// an id resolves to its latest entry.
#[derive(Debug)]
pub struct VectorStore {
    embedder: Embedder,
    engine: Option<EngineClient>,
    entries: Vec<VectorEntry>,
    index: LocalIndex,
    dimension: usize,
    overfetch_factor: usize,
}

impl VectorStore {
    /// Build the embedder, connect the engine when enabled and initialize
    /// its index. Never fails: an unavailable engine leaves the store on the
    /// local path.
    pub async fn open(config: StoreConfig) -> Self {
        let embedder = Embedder::from_config(&config.embedding);
        let engine = if config.engine.enabled {
            match EngineClient::connect(config.engine.clone()).await {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "Engine client unavailable, using local search only");
                    None
                }
            }
        } else {
            debug!("Engine disabled by configuration");
            None
        };

        let mut store = Self::with_parts(embedder, engine, &config.search);
        store.init_engine().await;
        store
    }

    /// A store that never talks to an engine.
    pub fn local(embedder: Embedder, search: &SearchConfig) -> Self {
        Self::with_parts(embedder, None, search)
    }

    fn with_parts(embedder: Embedder, engine: Option<EngineClient>, search: &SearchConfig) -> Self {
        let dimension = embedder.dimensions();
        let state = engine
            .as_ref()
            .map(EngineClient::state)
            .unwrap_or(EngineState::Disconnected);
        info!(
            dimension,
            embedder = embedder.kind(),
            engine = %state,
            "Vector store ready"
        );
        Self {
            embedder,
            engine,
            entries: Vec::new(),
            index: LocalIndex::new(dimension),
            dimension,
            overfetch_factor: search.overfetch_factor.max(1),
        }
    }

    async fn init_engine(&mut self) {
        let dimension = self.dimension;
        if let Some(engine) = self.connected_engine() {
            if let Err(e) = engine.init(dimension).await {
                warn!(error = %e, dimension, "Engine init failed");
            }
        }
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of every stored vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine
            .as_ref()
            .map(EngineClient::state)
            .unwrap_or(EngineState::Disconnected)
    }

    /// Whether searches currently go to the engine first.
    pub fn using_engine(&self) -> bool {
        self.engine_state() == EngineState::Connected
    }

    /// Opaque statistics reported by the engine.
    pub async fn engine_stats(&mut self) -> Result<Value> {
        match self.engine.as_mut() {
            Some(engine) => Ok(engine.stats().await?),
            None => Err(GolazoError::Engine("engine disabled".to_string())),
        }
    }

    /// Probe the engine's health once. Leaves the connection state alone.
    pub async fn engine_health(&self) -> Result<()> {
        match self.engine.as_ref() {
            Some(engine) => Ok(engine.health().await?),
            None => Err(GolazoError::Engine("engine disabled".to_string())),
        }
    }

    fn connected_engine(&mut self) -> Option<&mut EngineClient> {
        self.engine.as_mut().filter(|e| e.is_connected())
    }

    pub async fn add(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        metadata: Metadata,
    ) -> Result<()> {
        let text = text.into();
        let mut vectors = self.embed_documents(&[text.as_str()]).await?;
        let vector = vectors.pop().ok_or_else(|| {
            GolazoError::Embedding("embedder returned no vector".to_string())
        })?;

        let entry = VectorEntry {
            id: id.into(),
            vector,
            metadata,
            text,
        };
        self.push_one(entry).await;
        Ok(())
    }

    /// Add `(id, text, metadata)` documents in one embedding pass and one
    /// engine round trip.
    pub async fn add_batch(&mut self, documents: Vec<(String, String, Metadata)>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = documents.iter().map(|(_, text, _)| text.as_str()).collect();
        let vectors = self.embed_documents(&texts).await?;

        let start = self.entries.len();
        self.entries.extend(documents.into_iter().zip(vectors).map(
            |((id, text, metadata), vector)| VectorEntry {
                id,
                vector,
                metadata,
                text,
            },
        ));
        self.index.mark_dirty();
        debug!(added = self.entries.len() - start, total = self.entries.len(), "Batch added");

        if self.using_engine() {
            let items: Vec<EngineItem> = self.entries[start..]
                .iter()
                .map(VectorEntry::to_engine_item)
                .collect();
            if let Some(engine) = self.connected_engine() {
                if let Err(e) = engine.insert_batch(&items).await {
                    warn!(error = %e, count = items.len(), "Engine batch insert failed, kept locally");
                }
            }
        }
        Ok(())
    }

    /// Add a precomputed vector. Its length must equal [`dimension`](Self::dimension).
    pub async fn add_vector(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<()> {
        self.check_dimension(vector.len())?;
        let entry = VectorEntry {
            id: id.into(),
            vector,
            metadata,
            text: text.into(),
        };
        self.push_one(entry).await;
        Ok(())
    }

    async fn push_one(&mut self, entry: VectorEntry) {
        let item = self.using_engine().then(|| entry.to_engine_item());
        self.entries.push(entry);
        self.index.mark_dirty();

        if let (Some(item), Some(engine)) = (item, self.connected_engine()) {
            if let Err(e) = engine.insert(&item).await {
                warn!(error = %e, id = %item.id, "Engine insert failed, kept locally");
            }
        }
    }

    async fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embedder.fit(texts);
        let vectors = self.embedder.encode(texts).await?;
        if vectors.len() != texts.len() {
            return Err(GolazoError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        for vector in &vectors {
            self.check_dimension(vector.len())?;
        }
        Ok(vectors)
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimension {
            return Err(GolazoError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }

    /// Top `k` entries most similar to `query`.
    pub async fn search(&mut self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.search_filtered(query, k, |_| true).await
    }

    /// Top `k` entries most similar to `query` whose metadata passes `filter`.
    ///
    /// Fewer than `k` hits come back when the candidates run out; results
    /// are never backfilled.
    pub async fn search_filtered<F>(&mut self, query: &str, k: usize, filter: F) -> Result<Vec<SearchHit>>
    where
        F: Fn(&Metadata) -> bool + Send + Sync,
    {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let mut encoded = self.embedder.encode(&[query]).await?;
        let vector = encoded
            .pop()
            .ok_or_else(|| GolazoError::Embedding("embedder returned no vector".to_string()))?;
        self.search_vector(&vector, k, filter).await
    }

    /// Like [`search_filtered`](Self::search_filtered) with a precomputed
    /// query vector.
    pub async fn search_vector<F>(&mut self, vector: &[f32], k: usize, filter: F) -> Result<Vec<SearchHit>>
    where
        F: Fn(&Metadata) -> bool + Send + Sync,
    {
        self.check_dimension(vector.len())?;
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(hits) = self.search_engine(vector, k, &filter).await {
            return Ok(hits);
        }
        self.search_local(vector, k, &filter)
    }

    /// Engine path. `None` means the caller should fall back.
    async fn search_engine(
        &mut self,
        vector: &[f32],
        k: usize,
        filter: &(dyn Fn(&Metadata) -> bool + Send + Sync),
    ) -> Option<Vec<SearchHit>> {
        let fetch = k.saturating_mul(self.overfetch_factor);
        let engine = self.connected_engine()?;

        let hits = match engine.search(vector, fetch).await {
            Ok(hits) if hits.is_empty() => {
                debug!("Engine returned no hits, using local search");
                return None;
            }
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Engine search failed, using local search");
                return None;
            }
        };

        // Later entries overwrite earlier ones, so an id maps to its latest entry.
        let positions: HashMap<&str, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.id.as_str(), i))
            .collect();

        let mut results = Vec::with_capacity(k);
        for hit in hits {
            let Some(&position) = positions.get(hit.id.as_str()) else {
                debug!(id = %hit.id, "Engine hit has no local entry");
                continue;
            };
            let entry = &self.entries[position];
            if !filter(&entry.metadata) {
                continue;
            }
            results.push(SearchHit {
                entry: entry.clone(),
                score: hit.score,
            });
            if results.len() >= k {
                break;
            }
        }
        Some(results)
    }

    fn search_local(
        &mut self,
        vector: &[f32],
        k: usize,
        filter: &(dyn Fn(&Metadata) -> bool + Send + Sync),
    ) -> Result<Vec<SearchHit>> {
        self.ensure_index()?;

        let mut results = Vec::with_capacity(k);
        for (position, score) in self.index.rank(vector)? {
            let entry = &self.entries[position];
            if !filter(&entry.metadata) {
                continue;
            }
            results.push(SearchHit {
                entry: entry.clone(),
                score: f64::from(score),
            });
            if results.len() >= k {
                break;
            }
        }
        Ok(results)
    }

    fn ensure_index(&mut self) -> Result<()> {
        if self.index.is_dirty() {
            self.index
                .rebuild(self.entries.iter().map(|e| e.vector.as_slice()))?;
        }
        Ok(())
    }

    /// Remove every entry, locally and in the engine.
    pub async fn clear(&mut self) {
        self.entries.clear();
        self.index.reset(self.dimension);
        if let Some(engine) = self.connected_engine() {
            if let Err(e) = engine.clear().await {
                warn!(error = %e, "Engine clear failed");
            }
        }
        info!("Vector store cleared");
    }

    /// Write the entries to `dir`, creating it if needed.
    pub fn save(&mut self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.ensure_index()?;

        persist::write_matrix(&dir.join(VECTORS_FILE), self.index.matrix())?;
        let records: Vec<PersistedRecord> = self
            .entries
            .iter()
            .map(|e| PersistedRecord {
                id: e.id.clone(),
                text: e.text.clone(),
                metadata: e.metadata.clone(),
            })
            .collect();
        persist::write_records(&dir.join(METADATA_FILE), &records)?;

        info!(dir = %dir.display(), entries = records.len(), "Vector store saved");
        Ok(())
    }

    /// Replace the entries with the ones saved in `dir`.
    ///
    /// Nothing changes when the saved data is malformed. When connected, the
    /// engine is cleared and receives every loaded entry.
    pub async fn load(&mut self, dir: &Path) -> Result<()> {
        let records = persist::read_records(&dir.join(METADATA_FILE))?;

        let matrix_path = dir.join(VECTORS_FILE);
        let vectors: Vec<Vec<f32>> = if matrix_path.is_file() {
            let matrix = persist::read_matrix(&matrix_path)?;
            if matrix.nrows() != records.len() {
                return Err(GolazoError::Persistence(format!(
                    "{} has {} rows but {} lists {} entries",
                    VECTORS_FILE,
                    matrix.nrows(),
                    METADATA_FILE,
                    records.len()
                )));
            }
            if !records.is_empty() {
                self.check_dimension(matrix.ncols())?;
            }
            matrix.outer_iter().map(|row| row.to_vec()).collect()
        } else {
            warn!(dir = %dir.display(), "No saved vectors, loading zero-vector placeholders");
            vec![vec![0.0; self.dimension]; records.len()]
        };

        self.entries = records
            .into_iter()
            .zip(vectors)
            .map(|(record, vector)| VectorEntry {
                id: record.id,
                vector,
                metadata: record.metadata,
                text: record.text,
            })
            .collect();
        self.index.reset(self.dimension);
        self.index.mark_dirty();
        info!(dir = %dir.display(), entries = self.entries.len(), "Vector store loaded");

        if self.using_engine() {
            let items: Vec<EngineItem> =
                self.entries.iter().map(VectorEntry::to_engine_item).collect();
            if let Some(engine) = self.connected_engine() {
                if let Err(e) = engine.clear().await {
                    warn!(error = %e, "Engine clear before reload failed");
                } else if !items.is_empty() {
                    if let Err(e) = engine.insert_batch(&items).await {
                        warn!(error = %e, count = items.len(), "Engine reload failed");
                    }
                }
            }
        }
        Ok(())
    }

    /// Stop the engine process if this store launched it.
    pub async fn shutdown(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use serde_json::json;

    fn meta(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => Metadata::new(),
        }
    }

    fn store(dimension: usize) -> VectorStore {
        VectorStore::local(
            Embedder::Hashing(HashingEmbedder::new(dimension)),
            &SearchConfig::default(),
        )
    }

    fn one_hot(dimension: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[hot] = 1.0;
        v
    }

    async fn one_hot_store() -> VectorStore {
        let mut store = store(3);
        for i in 0..3 {
            store
                .add_vector(format!("e{}", i), format!("entry {}", i), one_hot(3, i), meta(json!({"slot": i})))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_open_with_engine_disabled() {
        let mut config = StoreConfig::default();
        config.engine.enabled = false;
        config.embedding.dimension = 64;

        let store = VectorStore::open(config).await;
        assert_eq!(store.dimension(), 64);
        assert!(store.is_empty());
        assert!(!store.using_engine());
        assert_eq!(store.engine_state(), EngineState::Disconnected);
    }

    #[tokio::test]
    async fn test_open_with_unreachable_engine_still_works() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut config = StoreConfig::default();
        config.embedding.dimension = 32;
        config.engine.host = "127.0.0.1".to_string();
        config.engine.port = port;
        config.engine.auto_start = false;
        config.engine.health_timeout_ms = 200;

        let mut store = VectorStore::open(config).await;
        assert!(!store.using_engine());

        store
            .add("m1", "Flamengo vs Palmeiras", meta(json!({"type": "match"})))
            .await
            .unwrap();
        let hits = store.search("Flamengo", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store.engine_stats().await.is_err());
    }

    #[tokio::test]
    async fn test_add_batch_grows_by_n() {
        let mut store = store(128);
        store.add("a", "Santos", Metadata::new()).await.unwrap();

        let docs = (0..5)
            .map(|i| (format!("doc{}", i), format!("text number {}", i), Metadata::new()))
            .collect();
        store.add_batch(docs).await.unwrap();
        assert_eq!(store.len(), 6);

        store.add_batch(Vec::new()).await.unwrap();
        assert_eq!(store.len(), 6);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_appended() {
        let mut store = store(64);
        store.add("x", "first", Metadata::new()).await.unwrap();
        store.add("x", "second", Metadata::new()).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[1].text, "second");
    }

    #[tokio::test]
    async fn test_one_hot_law() {
        let mut store = one_hot_store().await;
        let hits = store.search_vector(&one_hot(3, 1), 3, |_| true).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].entry.id, "e1");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!(hits[1].score.abs() < 1e-6);
        assert!(hits[2].score.abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_scores_non_increasing() {
        let mut store = store(256);
        for (i, text) in [
            "Flamengo beat Palmeiras at the Maracana",
            "Corinthians drew with Santos",
            "Palmeiras won the Libertadores final",
            "Gremio lost away to Internacional",
        ]
        .iter()
        .enumerate()
        {
            store.add(format!("m{}", i), *text, Metadata::new()).await.unwrap();
        }

        let hits = store.search("Palmeiras final", 4).await.unwrap();
        assert_eq!(hits.len(), 4);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(hits[0].entry.id, "m2");
    }

    #[tokio::test]
    async fn test_filtered_results_satisfy_filter() {
        let mut store = store(128);
        for i in 0..10 {
            let kind = if i % 2 == 0 { "match" } else { "player" };
            store
                .add(format!("id{}", i), format!("record {}", i), meta(json!({"type": kind})))
                .await
                .unwrap();
        }

        let hits = store
            .search_filtered("record", 10, |m| m.get("type") == Some(&json!("player")))
            .await
            .unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.iter().all(|h| h.entry.metadata["type"] == "player"));

        let none = store
            .search_filtered("record", 3, |m| m.get("type") == Some(&json!("stadium")))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_edge_cases() {
        let mut store = store(32);
        assert!(store.search("anything", 5).await.unwrap().is_empty());

        store.add("a", "Vasco", Metadata::new()).await.unwrap();
        assert!(store.search("Vasco", 0).await.unwrap().is_empty());
        assert_eq!(store.search("Vasco", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_new_entries_visible_to_next_search() {
        let mut store = one_hot_store().await;
        store.search_vector(&one_hot(3, 0), 1, |_| true).await.unwrap();

        store
            .add_vector("late", "late", vec![0.0, 0.6, 0.8], Metadata::new())
            .await
            .unwrap();
        let hits = store.search_vector(&[0.0, 0.6, 0.8], 1, |_| true).await.unwrap();
        assert_eq!(hits[0].entry.id, "late");
    }

    #[tokio::test]
    async fn test_dimension_policy() {
        let mut store = store(3);
        let err = store
            .add_vector("bad", "bad", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GolazoError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(store.is_empty());

        store.add_vector("ok", "ok", one_hot(3, 0), Metadata::new()).await.unwrap();
        assert!(store.search_vector(&[1.0; 4], 1, |_| true).await.is_err());
    }

    #[tokio::test]
    async fn test_clear() {
        let mut store = one_hot_store().await;
        store.clear().await;
        assert!(store.is_empty());
        assert!(store.search_vector(&one_hot(3, 0), 3, |_| true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = store(384);
        original
            .add("match_0", "Flamengo vs Fluminense", meta(json!({"type": "match", "season": 2019})))
            .await
            .unwrap();
        original
            .add("player_7", "Neymar Jr, Brazil", meta(json!({"type": "player", "overall": 92})))
            .await
            .unwrap();
        original.save(dir.path()).unwrap();

        let mut restored = store(384);
        restored.add("stale", "to be replaced", Metadata::new()).await.unwrap();
        restored.load(dir.path()).await.unwrap();

        assert_eq!(restored.len(), original.len());
        for (a, b) in original.entries().iter().zip(restored.entries()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.text, b.text);
            assert_eq!(a.metadata, b.metadata);
            for (x, y) in a.vector.iter().zip(&b.vector) {
                assert!((x - y).abs() < 1e-6);
            }
        }

        let hits = restored.search("Neymar", 1).await.unwrap();
        assert_eq!(hits[0].entry.id, "player_7");
    }

    #[tokio::test]
    async fn test_load_without_vectors_uses_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = store(16);
        original.add("a", "Bahia", Metadata::new()).await.unwrap();
        original.save(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(VECTORS_FILE)).unwrap();

        let mut restored = store(16);
        restored.load(dir.path()).await.unwrap();
        assert_eq!(restored.len(), 1);
        assert!(restored.entries()[0].vector.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_data() {
        let dir = tempfile::tempdir().unwrap();

        let mut restored = store(16);
        assert!(matches!(
            restored.load(dir.path()).await,
            Err(GolazoError::Persistence(_))
        ));

        let mut original = store(16);
        original.add("a", "Bahia", Metadata::new()).await.unwrap();
        original.add("b", "Vitoria", Metadata::new()).await.unwrap();
        original.save(dir.path()).unwrap();

        // Wrong dimension.
        let mut narrow = store(8);
        narrow.add("keep", "kept", Metadata::new()).await.unwrap();
        assert!(matches!(
            narrow.load(dir.path()).await,
            Err(GolazoError::DimensionMismatch { expected: 8, actual: 16 })
        ));
        assert_eq!(narrow.entries()[0].id, "keep");

        // Row count mismatch.
        let records = vec![PersistedRecord {
            id: "a".to_string(),
            text: "Bahia".to_string(),
            metadata: Metadata::new(),
        }];
        persist::write_records(&dir.path().join(METADATA_FILE), &records).unwrap();
        assert!(matches!(
            restored.load(dir.path()).await,
            Err(GolazoError::Persistence(_))
        ));
    }

    #[test]
    fn test_store_config_from_golazo_config() {
        let mut config = GolazoConfig::default();
        config.engine.port = 4000;
        config.search.overfetch_factor = 3;
        let store_config = StoreConfig::from(&config);
        assert_eq!(store_config.engine.port, 4000);
        assert_eq!(store_config.search.overfetch_factor, 3);
        assert_eq!(store_config.embedding.dimension, config.embedding.dimension);
    }
}
