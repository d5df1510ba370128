//! Text embedders.
//!
//! - `HashingEmbedder` maps whitespace tokens to slots with a stable hash and
//!   counts them (feature hashing). Always available.
//! - `OnnxEmbedder` loads a sentence-transformer ONNX model (e.g.
//!   all-MiniLM-L6-v2) via ort and tokenizes with the HuggingFace tokenizers
//!   crate.
//!
//! The store only talks to [`Embedder`], which dispatches to either variant.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use golazo_core::config::EmbeddingConfig;
use golazo_core::error::{GolazoError, Result};
use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

/// Dimension assumed when an ONNX model does not declare its output width.
const DEFAULT_MODEL_DIMENSIONS: usize = 384;

// ---------------------------------------------------------------------------
// Embedder - the variant the store holds
// ---------------------------------------------------------------------------

/// Text embedder used by the vector store.
#[derive(Debug)]
pub enum Embedder {
    Hashing(HashingEmbedder),
    Pretrained(OnnxEmbedder),
}

impl Embedder {
    /// Build the embedder described by `config`.
    ///
    /// Uses the pretrained model when `model_dir` is set and loads cleanly;
    /// any load failure is logged and the hashing embedder is used instead.
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let Some(model_dir) = config.model_dir.as_deref() else {
            return Embedder::Hashing(HashingEmbedder::new(config.dimension));
        };

        match OnnxEmbedder::from_directory(Path::new(model_dir)) {
            Ok(model) => {
                info!(
                    model = %config.model_name,
                    dimensions = model.dimensions(),
                    "Using pretrained embedder"
                );
                Embedder::Pretrained(model)
            }
            Err(e) => {
                warn!(
                    model = %config.model_name,
                    error = %e,
                    "Pretrained embedder unavailable, falling back to hashing embedder"
                );
                Embedder::Hashing(HashingEmbedder::new(config.dimension))
            }
        }
    }

    /// Grow the vocabulary with the given texts. No-op for pretrained models.
    pub fn fit(&mut self, texts: &[&str]) {
        if let Embedder::Hashing(hashing) = self {
            hashing.fit(texts);
        }
    }

    /// Encode each text into one L2-normalized vector of `dimensions()` floats.
    pub async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        match self {
            Embedder::Hashing(hashing) => Ok(hashing.encode(texts)),
            Embedder::Pretrained(model) => model.encode(texts).await,
        }
    }

    /// Dimensionality of the produced vectors.
    pub fn dimensions(&self) -> usize {
        match self {
            Embedder::Hashing(hashing) => hashing.dimensions(),
            Embedder::Pretrained(model) => model.dimensions(),
        }
    }

    /// Short name of the active variant, for logs and status output.
    pub fn kind(&self) -> &'static str {
        match self {
            Embedder::Hashing(_) => "hashing",
            Embedder::Pretrained(_) => "pretrained",
        }
    }
}

// ---------------------------------------------------------------------------
// HashingEmbedder - feature hashing over whitespace tokens
// ---------------------------------------------------------------------------

/// Bag-of-words embedder with hashed slots.
///
/// Tokens are lowercased whitespace-separated words. Each token lands in slot
/// `fnv1a(token) % dimensions`; colliding tokens share a slot and their counts
/// add up. Vectors are L2-normalized, except all-zero vectors which are
/// returned as is.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    vocabulary: HashMap<String, usize>,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            vocabulary: HashMap::new(),
        }
    }

    /// Assign slots to tokens not seen before. The vocabulary never shrinks.
    pub fn fit(&mut self, texts: &[&str]) {
        let before = self.vocabulary.len();
        for text in texts {
            for token in tokenize(text) {
                if !self.vocabulary.contains_key(&token) {
                    let slot = self.hash_slot(&token);
                    self.vocabulary.insert(token, slot);
                }
            }
        }
        debug!(
            added = self.vocabulary.len() - before,
            vocabulary = self.vocabulary.len(),
            "Hashing vocabulary fitted"
        );
    }

    pub fn encode(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|text| self.encode_one(text)).collect()
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let slot = match self.vocabulary.get(&token) {
                Some(&slot) => slot,
                None => self.hash_slot(&token),
            };
            vector[slot] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }

    fn hash_slot(&self, token: &str) -> usize {
        (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of distinct tokens seen by `fit`.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(|t| t.to_lowercase())
}

/// 64-bit FNV-1a. Stable across builds, unlike `DefaultHasher`, so persisted
/// vectors keep matching freshly encoded queries.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}

// ---------------------------------------------------------------------------
// OnnxEmbedder - ONNX Runtime inference
// ---------------------------------------------------------------------------

/// ONNX Runtime-backed sentence-transformer.
///
/// Expects a model directory containing:
/// - `model.onnx`  - the sentence-transformer ONNX export
/// - `tokenizer.json` - the HuggingFace fast-tokenizer file
///
/// The model takes `input_ids`, `attention_mask` and `token_type_ids` as i64
/// inputs and produces token-level embeddings, which are mean-pooled under
/// the attention mask.
#[derive(Clone)]
pub struct OnnxEmbedder {
    model: Arc<OnnxModel>,
}

struct OnnxModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimensions: usize,
}

// ort::Session is Send + Sync internally (uses Arc<SharedSessionInner>).
unsafe impl Send for OnnxModel {}
unsafe impl Sync for OnnxModel {}

impl std::fmt::Debug for OnnxEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbedder")
            .field("dimensions", &self.model.dimensions)
            .finish()
    }
}

impl OnnxEmbedder {
    /// Load a sentence-transformer model from the given directory.
    pub fn from_directory(model_dir: &Path) -> Result<Self> {
        Self::from_files(
            &model_dir.join("model.onnx"),
            &model_dir.join("tokenizer.json"),
        )
    }

    /// Load from explicit model and tokenizer file paths.
    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(GolazoError::Embedding(format!(
                "ONNX model not found at {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(GolazoError::Embedding(format!(
                "Tokenizer not found at {}",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| GolazoError::Embedding(format!("ONNX session builder: {}", e)))?
            .with_intra_threads(1)
            .map_err(|e| GolazoError::Embedding(format!("ONNX set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| GolazoError::Embedding(format!("ONNX load model: {}", e)))?;

        // Output is [batch, seq_len, hidden_dim]; the last axis is the width.
        let dimensions = session
            .outputs()
            .first()
            .and_then(|out| out.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .map(|d| if d > 0 { d as usize } else { DEFAULT_MODEL_DIMENSIONS })
            .unwrap_or(DEFAULT_MODEL_DIMENSIONS);

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| GolazoError::Embedding(format!("Failed to load tokenizer: {}", e)))?;

        info!(
            model = %model_path.display(),
            dimensions,
            "Loaded ONNX embedding model"
        );

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
                dimensions,
            }),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.model.dimensions
    }

    /// Encode texts on the blocking pool; inference is CPU-bound.
    pub async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();

        tokio::task::spawn_blocking(move || {
            owned
                .iter()
                .map(|text| model.embed_one(text))
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| GolazoError::Embedding(format!("Embedding task panicked: {}", e)))?
    }
}

impl OnnxModel {
    /// Tokenize, run inference, and mean-pool the output.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| GolazoError::Embedding(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let seq_len = input_ids.len();

        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| GolazoError::Embedding(format!("input_ids array: {}", e)))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(|e| GolazoError::Embedding(format!("attention_mask array: {}", e)))?;
        let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| GolazoError::Embedding(format!("token_type_ids array: {}", e)))?;

        let ids_ref = TensorRef::from_array_view(&ids_array)
            .map_err(|e| GolazoError::Embedding(format!("TensorRef input_ids: {}", e)))?;
        let mask_ref = TensorRef::from_array_view(&mask_array)
            .map_err(|e| GolazoError::Embedding(format!("TensorRef attention_mask: {}", e)))?;
        let type_ref = TensorRef::from_array_view(&type_array)
            .map_err(|e| GolazoError::Embedding(format!("TensorRef token_type_ids: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| GolazoError::Embedding(format!("Session lock poisoned: {}", e)))?;
        let outputs = session
            .run(ort::inputs![ids_ref, mask_ref, type_ref])
            .map_err(|e| GolazoError::Embedding(format!("ONNX inference failed: {}", e)))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| GolazoError::Embedding(format!("Extract embeddings: {}", e)))?;

        let hidden_dim = match shape.iter().copied().collect::<Vec<i64>>().as_slice() {
            [_, .., last] => *last as usize,
            other => {
                return Err(GolazoError::Embedding(format!(
                    "Unexpected output shape: {:?}",
                    other
                )))
            }
        };

        let mut pooled = vec![0.0f32; hidden_dim];
        let mut count = 0.0f32;

        for (tok_idx, &mask_val) in attention_mask.iter().enumerate() {
            if mask_val > 0 {
                let offset = tok_idx * hidden_dim;
                for (dim, slot) in pooled.iter_mut().enumerate() {
                    *slot += data[offset + dim];
                }
                count += 1.0;
            }
        }

        if count > 0.0 {
            for val in &mut pooled {
                *val /= count;
            }
        }

        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}
