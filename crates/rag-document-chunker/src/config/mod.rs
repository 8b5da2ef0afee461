pub mod settings;

pub use settings::{
    ChunkingConfig, DocumentConfig, ExportConfig, LoggingConfig, PartitionerConfig,
    PartitionerKind, Settings, TokenizerConfig, UploadConfig,
};
