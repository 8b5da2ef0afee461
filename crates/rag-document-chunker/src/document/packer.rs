//! Greedy sentence packing under a token budget.
//!
//! Sentences are appended to the current chunk until the next one would
//! exceed `max_tokens`. A sentence that alone exceeds the budget is cut at
//! token boundaries into budget-sized pieces, each emitted as its own chunk.

use super::chunk::{Chunk, Document, TableLink};
use crate::nlp::segmenter::TaggedSentence;
use crate::nlp::tokenizer::Tokenizer;
use crate::utils::error::{IngestError, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ChunkPacker {
    tokenizer: Arc<dyn Tokenizer>,
    max_tokens: usize,
}

impl ChunkPacker {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, max_tokens: usize) -> Result<Self> {
        if max_tokens == 0 {
            return Err(IngestError::InvalidConfig(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            tokenizer,
            max_tokens,
        })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Pack `sentences` into chunks of `document`, numbering them from the
    /// document's counter. Tokenizer failures abort the whole call.
    pub fn pack(
        &self,
        document: &mut Document,
        sentences: &[TaggedSentence],
        table: Option<&TableLink>,
    ) -> Result<Vec<Chunk>> {
        let Some(first) = sentences.first() else {
            return Ok(Vec::new());
        };

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_tokens = 0usize;
        let mut current_page = first.page_number;

        for sentence in sentences {
            let tokens = self.tokenizer.token_count(&sentence.text)?;

            if current_tokens + tokens > self.max_tokens && !current.is_empty() {
                chunks.push(document.emit_chunk(&current, current_page, table));
                current.clear();
                current_tokens = 0;
                current_page = sentence.page_number;
            }

            if tokens > self.max_tokens {
                for piece in self.split_oversized(&sentence.text)? {
                    chunks.push(document.emit_chunk(&[piece], current_page, table));
                }
                continue;
            }

            current.push(&sentence.text);
            current_tokens += tokens;
        }

        if !current.is_empty() {
            chunks.push(document.emit_chunk(&current, current_page, table));
        }

        debug!(
            "Packed {} sentences into {} chunks (max_tokens={})",
            sentences.len(),
            chunks.len(),
            self.max_tokens
        );

        Ok(chunks)
    }

    fn split_oversized(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self.tokenizer.tokenize(text)?;

        debug!(
            "Splitting oversized sentence of {} tokens into pieces of {}",
            tokens.len(),
            self.max_tokens
        );

        tokens
            .chunks(self.max_tokens)
            .map(|group| self.tokenizer.detokenize(group))
            .collect()
    }
}
