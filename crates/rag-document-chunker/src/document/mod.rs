pub mod chunk;
pub mod element;
pub mod normalizer;
pub mod packer;
pub mod table;

pub use chunk::{Chunk, Document, TableLink};
pub use element::{classify, Coordinates, ElementCategory, RawElement};
pub use normalizer::normalize_text;
pub use packer::ChunkPacker;
pub use table::{ExtractedTable, TableExtractor, TableGrid};
