pub mod extract;
pub mod normalize;
pub mod pipeline;

pub use pipeline::{IngestPipeline, IngestReport};
