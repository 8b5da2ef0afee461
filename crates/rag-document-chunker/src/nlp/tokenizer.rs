//! Sub-word tokenizer port.
//!
//! Plug in the tokenizer of the embedding model the chunks are meant for;
//! `max_tokens` is measured in its units.

use crate::utils::error::{IngestError, Result};
use std::path::Path;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Length measurement and splitting of text in model tokens.
#[cfg_attr(test, automock)]
pub trait Tokenizer: Send + Sync {
    /// Number of tokens in `text`, without special tokens.
    fn token_count(&self, text: &str) -> Result<usize>;

    /// Sub-word token ids of `text`, without special tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<u32>>;

    /// Reassemble token ids into text.
    fn detokenize(&self, tokens: &[u32]) -> Result<String>;
}

/// HuggingFace `tokenizer.json` backed tokenizer.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            IngestError::Tokenizer(format!("Failed to load tokenizer {:?}: {}", path, e))
        })?;

        debug!(
            "Loaded tokenizer {:?} (vocab size {})",
            path,
            tokenizer.get_vocab_size(true)
        );

        Self::from_tokenizer(tokenizer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let tokenizer = tokenizers::Tokenizer::from_bytes(bytes)
            .map_err(|e| IngestError::Tokenizer(format!("Failed to deserialize tokenizer: {}", e)))?;

        Self::from_tokenizer(tokenizer)
    }

    fn from_tokenizer(mut tokenizer: tokenizers::Tokenizer) -> Result<Self> {
        // Counts cover the whole text
        tokenizer
            .with_truncation(None)
            .map_err(|e| IngestError::Tokenizer(format!("Failed to disable truncation: {}", e)))?;
        tokenizer.with_padding(None);

        Ok(Self { inner: tokenizer })
    }

    fn encode(&self, text: &str) -> Result<tokenizers::Encoding> {
        self.inner
            .encode(text, false)
            .map_err(|e| IngestError::Tokenizer(format!("Encoding failed: {}", e)))
    }
}

impl Tokenizer for HfTokenizer {
    fn token_count(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        Ok(self.encode(text)?.get_ids().to_vec())
    }

    fn detokenize(&self, tokens: &[u32]) -> Result<String> {
        self.inner
            .decode(tokens, true)
            .map_err(|e| IngestError::Tokenizer(format!("Decoding failed: {}", e)))
    }
}
