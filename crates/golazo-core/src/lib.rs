pub mod config;
pub mod error;
pub mod types;

pub use config::GolazoConfig;
pub use error::{GolazoError, Result};
pub use types::*;
