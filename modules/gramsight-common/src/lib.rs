pub mod config;
pub mod embedder;
pub mod error;
pub mod types;

pub use config::Config;
pub use embedder::TextEmbedder;
pub use error::{GramsightError, ValidationError};
pub use types::*;
