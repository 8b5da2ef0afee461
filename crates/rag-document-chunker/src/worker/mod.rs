pub mod export;
pub mod processor;
pub mod upload;

pub use export::{format_data, to_bulk_ndjson, BulkRecord};
pub use processor::{
    DocumentProcessor, PdfProcessor, ProcessedElement, ProcessingContext, ProcessorFactory,
    ProcessorState,
};
pub use upload::ScopedUpload;

use crate::document::chunk::Chunk;
use crate::utils::error::Result;
use std::path::Path;
use tracing::{error, info};

/// Process an uploaded file end to end. The upload copy is removed on return,
/// whether processing succeeded or not.
pub fn ingest_upload(
    upload_dir: &Path,
    source: &Path,
    url: &str,
    context: ProcessingContext,
) -> Result<Vec<Chunk>> {
    let upload = ScopedUpload::copy_from(upload_dir, source)?;
    info!("📄 Processing upload {:?}", upload.path());

    let metrics = context.metrics.clone();
    let mut processor = ProcessorFactory::for_path(upload.path(), url, context)?;
    match processor.process() {
        Ok(()) => {
            metrics.increment_documents_processed();
            info!(
                "✅ {} processed: {} chunks",
                processor.document().filename,
                processor.chunks().len()
            );
            Ok(processor.chunks().to_vec())
        }
        Err(e) => {
            metrics.increment_documents_failed();
            error!("❌ Failed to process {:?}: {}", source, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::element::RawElement;
    use crate::document::packer::ChunkPacker;
    use crate::nlp::segmenter::{SentenceSegmenterAdapter, UnicodeSentenceSegmenter};
    use crate::partition::MockPartitioner;
    use crate::test_utils::WordTokenizer;
    use crate::utils::error::IngestError;
    use crate::utils::metrics::{Metrics, MetricsSnapshot};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(partitioner: MockPartitioner) -> ProcessingContext {
        context_with_metrics(partitioner, Metrics::new())
    }

    fn context_with_metrics(partitioner: MockPartitioner, metrics: Metrics) -> ProcessingContext {
        ProcessingContext {
            partitioner: Arc::new(partitioner),
            segmenter: SentenceSegmenterAdapter::new(Arc::new(UnicodeSentenceSegmenter)),
            packer: ChunkPacker::new(Arc::new(WordTokenizer::new()), 50).unwrap(),
            languages: vec!["ron".to_string()],
            metrics,
        }
    }

    #[test]
    fn test_ingest_removes_upload_after_success() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("act.pdf");
        fs::write(&source, b"%PDF").unwrap();
        let uploads = dir.path().join("uploads");

        let mut partitioner = MockPartitioner::new();
        let expected_path = uploads.join("act.pdf");
        partitioner
            .expect_partition()
            .withf(move |path, _| path.to_path_buf() == expected_path && path.exists())
            .returning(|_, _| Ok(vec![RawElement::new("NarrativeText", "Un text.", 1)]));

        let chunks = ingest_upload(&uploads, &source, "https://x/act.pdf", context(partitioner)).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].url, "https://x/act.pdf");
        assert!(!uploads.join("act.pdf").exists());
        assert!(source.exists());
    }

    #[test]
    fn test_ingest_removes_upload_after_failure() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("act.pdf");
        fs::write(&source, b"%PDF").unwrap();
        let uploads = dir.path().join("uploads");

        let mut partitioner = MockPartitioner::new();
        partitioner
            .expect_partition()
            .returning(|_, _| Err(IngestError::Partition("timeout".to_string())));

        let result = ingest_upload(&uploads, &source, "u", context(partitioner));

        assert!(matches!(result, Err(IngestError::Partition(_))));
        assert!(!uploads.join("act.pdf").exists());
    }

    #[test]
    fn test_ingest_records_outcome_metrics() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("act.pdf");
        fs::write(&source, b"%PDF").unwrap();
        let uploads = dir.path().join("uploads");
        let metrics = Metrics::new();

        let mut ok = MockPartitioner::new();
        ok.expect_partition().returning(|_, _| {
            Ok(vec![
                RawElement::new("NarrativeText", "Primul text.", 1),
                RawElement::new("NarrativeText", "Al doilea text.", 2),
            ])
        });
        let chunks =
            ingest_upload(&uploads, &source, "u", context_with_metrics(ok, metrics.clone())).unwrap();

        let mut failing = MockPartitioner::new();
        failing
            .expect_partition()
            .returning(|_, _| Err(IngestError::Partition("timeout".to_string())));
        assert!(ingest_upload(&uploads, &source, "u", context_with_metrics(failing, metrics.clone())).is_err());

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                documents_processed: 1,
                documents_failed: 1,
                chunks_created: chunks.len() as u64,
            }
        );
    }
}
