pub mod config;
pub mod document;
pub mod nlp;
pub mod partition;
pub mod utils;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Settings;
pub use document::{Chunk, ChunkPacker, Document, RawElement};
pub use utils::error::{IngestError, Result};
pub use worker::{DocumentProcessor, ProcessingContext, ProcessorFactory};
