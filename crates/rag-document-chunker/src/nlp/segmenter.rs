use crate::document::normalizer::normalize_text;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use unicode_segmentation::UnicodeSegmentation;

#[cfg(test)]
use mockall::automock;

/// A sentence tagged with the page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    pub text: String,
    pub page_number: u32,
}

impl TaggedSentence {
    pub fn new(text: impl Into<String>, page_number: u32) -> Self {
        Self {
            text: text.into(),
            page_number,
        }
    }
}

/// Sentence boundary detection port.
#[cfg_attr(test, automock)]
pub trait SentenceSegmenter: Send + Sync {
    fn segment_sentences(&self, text: &str) -> Result<Vec<String>>;
}

/// Rule-based segmenter over Unicode sentence boundaries (UAX #29).
#[derive(Debug, Default, Clone)]
pub struct UnicodeSentenceSegmenter;

impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn segment_sentences(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .unicode_sentences()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

/// Result of segmenting one element's text.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationOutcome {
    Sentences(Vec<TaggedSentence>),
    Failed { reason: String },
}

impl SegmentationOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SegmentationOutcome::Failed { .. })
    }

    /// Sentences of a successful run; a failed run contributes none.
    pub fn into_sentences(self) -> Vec<TaggedSentence> {
        match self {
            SegmentationOutcome::Sentences(sentences) => sentences,
            SegmentationOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// Normalizes text, delegates to the segmenter port and tags sentences with a page.
#[derive(Clone)]
pub struct SentenceSegmenterAdapter {
    segmenter: Arc<dyn SentenceSegmenter>,
}

impl SentenceSegmenterAdapter {
    pub fn new(segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        Self { segmenter }
    }

    pub fn segment(&self, text: &str, page_number: u32) -> SegmentationOutcome {
        let text = normalize_text(text);
        if text.is_empty() {
            return SegmentationOutcome::Sentences(Vec::new());
        }

        match self.segmenter.segment_sentences(&text) {
            Ok(sentences) => {
                let tagged: Vec<TaggedSentence> = sentences
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| TaggedSentence::new(s, page_number))
                    .collect();

                debug!("Segmented {} sentences on page {}", tagged.len(), page_number);
                SegmentationOutcome::Sentences(tagged)
            }
            Err(e) => {
                error!("Sentence segmentation failed on page {}: {}", page_number, e);
                SegmentationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::IngestError;

    #[test]
    fn test_unicode_segmenter_splits_sentences() {
        let sentences = UnicodeSentenceSegmenter
            .segment_sentences("Prima propozitie. A doua propozitie? Gata!")
            .unwrap();
        assert_eq!(
            sentences,
            vec!["Prima propozitie.", "A doua propozitie?", "Gata!"]
        );
    }

    #[test]
    fn test_adapter_tags_page_and_normalizes() {
        let adapter = SentenceSegmenterAdapter::new(Arc::new(UnicodeSentenceSegmenter));
        let outcome = adapter.segment("  Unu.\n\n Doi ........ 4", 5);

        assert_eq!(
            outcome,
            SegmentationOutcome::Sentences(vec![
                TaggedSentence::new("Unu.", 5),
                TaggedSentence::new("Doi", 5),
            ])
        );
    }

    #[test]
    fn test_adapter_records_failure() {
        let mut segmenter = MockSentenceSegmenter::new();
        segmenter
            .expect_segment_sentences()
            .returning(|_| Err(IngestError::Segmentation("model crashed".to_string())));

        let adapter = SentenceSegmenterAdapter::new(Arc::new(segmenter));
        let outcome = adapter.segment("Some text.", 1);

        assert!(outcome.is_failed());
        assert!(outcome.into_sentences().is_empty());
    }

    #[test]
    fn test_empty_text_skips_model() {
        let mut segmenter = MockSentenceSegmenter::new();
        segmenter.expect_segment_sentences().never();

        let adapter = SentenceSegmenterAdapter::new(Arc::new(segmenter));
        assert_eq!(
            adapter.segment("   \n", 1),
            SegmentationOutcome::Sentences(Vec::new())
        );
    }
}
