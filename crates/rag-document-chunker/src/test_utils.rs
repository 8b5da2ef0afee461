use crate::nlp::tokenizer::Tokenizer;
use crate::utils::error::Result;
use std::sync::Mutex;

/// Whitespace tokenizer: one token per word, ids interned on first sight.
#[derive(Default)]
pub struct WordTokenizer {
    vocab: Mutex<Vec<String>>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tokenizer for WordTokenizer {
    fn token_count(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        let mut vocab = self.vocab.lock().unwrap();
        Ok(text
            .split_whitespace()
            .map(|word| match vocab.iter().position(|w| w == word) {
                Some(id) => id as u32,
                None => {
                    vocab.push(word.to_string());
                    (vocab.len() - 1) as u32
                }
            })
            .collect())
    }

    fn detokenize(&self, tokens: &[u32]) -> Result<String> {
        let vocab = self.vocab.lock().unwrap();
        Ok(tokens
            .iter()
            .filter_map(|id| vocab.get(*id as usize).cloned())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Sentence made of `n` distinct words, e.g. `words("a", 3)` is "a0 a1 a2".
pub fn words(prefix: &str, n: usize) -> String {
    (0..n)
        .map(|i| format!("{prefix}{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}
