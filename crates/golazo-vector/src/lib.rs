//! Golazo vector crate - embedders, local cosine index, external engine
//! bridge, and the vector store that ties them together.
//!
//! The store writes every entry to both the local index and, when one is
//! reachable, the external similarity engine. Searches prefer the engine and
//! fall back to brute-force cosine similarity over the local entries.

pub mod adapters;
pub mod embedding;
pub mod engine;
pub mod index;
pub mod persist;
pub mod store;

pub use adapters::{MatchFilter, PlayerFilter};
pub use embedding::{Embedder, HashingEmbedder, OnnxEmbedder};
pub use engine::{EngineClient, EngineError, EngineState};
pub use index::LocalIndex;
pub use store::{Metadata, SearchHit, StoreConfig, VectorEntry, VectorStore};
