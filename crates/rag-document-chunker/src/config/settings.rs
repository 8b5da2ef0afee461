use crate::utils::error::{IngestError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub partitioner: PartitionerConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChunkingConfig {
    /// Context window of the embedding model, in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenizerConfig {
    /// HuggingFace `tokenizer.json` of the embedding model
    #[serde(default = "default_tokenizer_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    Api,  // Unstructured partition service
    File, // pre-computed elements JSON next to the source file
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PartitionerConfig {
    #[serde(default = "default_partitioner_kind")]
    pub kind: PartitionerKind,
    #[serde(default = "default_partitioner_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// When unset, exports land next to the source file
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DocumentConfig {
    /// Prefix used to build a document url when none is given
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_logs_dir")]
    pub dir: PathBuf,
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Rolling files are named `<file_prefix>.<date>.log`
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

fn default_max_tokens() -> usize {
    512
}

fn default_tokenizer_path() -> PathBuf {
    PathBuf::from("models/tokenizer.json")
}

fn default_partitioner_kind() -> PartitionerKind {
    PartitionerKind::Api
}

fn default_partitioner_url() -> String {
    "http://localhost:8000/general/v0/general".to_string()
}

fn default_strategy() -> String {
    "hi_res".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["ron".to_string()]
}

fn default_timeout_seconds() -> u64 {
    600
}

fn default_index_name() -> String {
    "documents".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info,rag_chunk=debug,rag_document_chunker=debug".to_string()
}

fn default_log_file_prefix() -> String {
    "rag-chunk".to_string()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            path: default_tokenizer_path(),
        }
    }
}

impl Default for PartitionerConfig {
    fn default() -> Self {
        Self {
            kind: default_partitioner_kind(),
            url: default_partitioner_url(),
            api_key: None,
            strategy: default_strategy(),
            languages: default_languages(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            output_dir: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logs_dir(),
            level: default_log_level(),
            file_prefix: default_log_file_prefix(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            // Override with environment variables (prefix: APP)
            // Example: APP__CHUNKING__MAX_TOKENS=256
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("partitioner.languages")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_tokens == 0 {
            return Err(IngestError::InvalidConfig(
                "chunking.max_tokens must be greater than zero".to_string(),
            ));
        }

        if self.export.index_name.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "export.index_name must not be empty".to_string(),
            ));
        }

        if self.partitioner.kind == PartitionerKind::Api && self.partitioner.url.is_empty() {
            return Err(IngestError::InvalidConfig(
                "partitioner.url is required for the api partitioner".to_string(),
            ));
        }

        if self.logging.file_prefix.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "logging.file_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Url recorded on every chunk of a document.
    pub fn document_url(&self, filename: &str) -> String {
        if self.document.base_url.is_empty() {
            return filename.to_string();
        }
        format!("{}/{}", self.document.base_url.trim_end_matches('/'), filename)
    }
}
