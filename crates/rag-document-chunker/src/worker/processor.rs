use super::export::{self, BulkRecord};
use crate::config::Settings;
use crate::document::chunk::{Chunk, Document};
use crate::document::element::{ElementCategory, RawElement};
use crate::document::normalizer::normalize_text;
use crate::document::packer::ChunkPacker;
use crate::document::table::{TableExtractor, TableGrid};
use crate::nlp::segmenter::{
    SegmentationOutcome, SentenceSegmenterAdapter, TaggedSentence, UnicodeSentenceSegmenter,
};
use crate::nlp::tokenizer::HfTokenizer;
use crate::partition::{self, Partitioner};
use crate::utils::error::{IngestError, Result};
use crate::utils::metrics::Metrics;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Created,
    Partitioned,
    Cleaned,
    Chunked,
    Exported,
}

impl ProcessorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorState::Created => "Created",
            ProcessorState::Partitioned => "Partitioned",
            ProcessorState::Cleaned => "Cleaned",
            ProcessorState::Chunked => "Chunked",
            ProcessorState::Exported => "Exported",
        }
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborators shared by every processor.
#[derive(Clone)]
pub struct ProcessingContext {
    pub partitioner: Arc<dyn Partitioner>,
    pub segmenter: SentenceSegmenterAdapter,
    pub packer: ChunkPacker,
    /// OCR language hints passed to the partitioner
    pub languages: Vec<String>,
    pub metrics: Metrics,
}

impl ProcessingContext {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let tokenizer = HfTokenizer::from_file(&settings.tokenizer.path)?;

        Ok(Self {
            partitioner: partition::from_config(&settings.partitioner)?,
            segmenter: SentenceSegmenterAdapter::new(Arc::new(UnicodeSentenceSegmenter)),
            packer: ChunkPacker::new(Arc::new(tokenizer), settings.chunking.max_tokens)?,
            languages: settings.partitioner.languages.clone(),
            metrics: Metrics::new(),
        })
    }
}

/// Partitioned element plus its cleaned table grid, if it is a usable table.
#[derive(Debug, Clone)]
pub struct ProcessedElement {
    pub raw: RawElement,
    pub grid: Option<TableGrid>,
}

/// Capability interface of a document type.
pub trait DocumentProcessor {
    fn document(&self) -> &Document;

    fn state(&self) -> ProcessorState;

    fn partition(&mut self) -> Result<()>;

    fn cleanup(&mut self) -> Result<()>;

    fn perform_chunking(&mut self) -> Result<()>;

    /// Partition, clean up and chunk in one go.
    fn process(&mut self) -> Result<()> {
        self.partition()?;
        self.cleanup()?;
        self.perform_chunking()
    }

    fn chunks(&self) -> &[Chunk] {
        &self.document().chunks
    }

    fn format_data(&self, index_name: &str) -> Option<Vec<BulkRecord>> {
        export::format_data(self.chunks(), index_name)
    }

    /// Write chunks as JSON, to `output` or next to the source file.
    /// Returns the written path, or `None` when there are no chunks.
    fn export_chunked_document(&mut self, output: Option<&Path>) -> Result<Option<PathBuf>>;
}

pub struct ProcessorFactory;

impl ProcessorFactory {
    /// Pick the processor for `path` by its file type.
    pub fn for_path(
        path: &Path,
        url: &str,
        context: ProcessingContext,
    ) -> Result<Box<dyn DocumentProcessor>> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!("Detected file type: {} for {:?}", mime.essence_str(), path);

        match mime.essence_str() {
            "application/pdf" => Ok(Box::new(PdfProcessor::new(path, url, context))),
            other => Err(IngestError::UnsupportedFileType(format!(
                "{} ({:?})",
                other, path
            ))),
        }
    }
}

pub struct PdfProcessor {
    document: Document,
    context: ProcessingContext,
    tables: TableExtractor,
    elements: Vec<ProcessedElement>,
    state: ProcessorState,
}

impl PdfProcessor {
    pub fn new(path: impl Into<PathBuf>, url: &str, context: ProcessingContext) -> Self {
        let tables = TableExtractor::new(context.segmenter.clone());

        Self {
            document: Document::new(path, url, "pdf"),
            context,
            tables,
            elements: Vec::new(),
            state: ProcessorState::Created,
        }
    }

    pub fn elements(&self) -> &[ProcessedElement] {
        &self.elements
    }

    fn expect_state(&self, expected: ProcessorState) -> Result<()> {
        if self.state != expected {
            return Err(IngestError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            });
        }
        Ok(())
    }

    fn clean_element(mut raw: RawElement) -> ProcessedElement {
        match raw.category() {
            ElementCategory::Textual => {
                raw.text = normalize_text(&raw.text);
                ProcessedElement { raw, grid: None }
            }
            ElementCategory::Table => {
                let grid = match raw.table_html.as_deref() {
                    Some(html) => match TableExtractor::clean(html, &raw.text, raw.table_as_cells) {
                        Ok(grid) => Some(grid),
                        Err(e) => {
                            warn!("Skipping table on page {}: {}", raw.page_number, e);
                            None
                        }
                    },
                    None => {
                        warn!("Skipping table without markup on page {}", raw.page_number);
                        None
                    }
                };
                ProcessedElement { raw, grid }
            }
            ElementCategory::Image | ElementCategory::Other => ProcessedElement { raw, grid: None },
        }
    }

    fn flush(&self, document: &mut Document, pending: &mut Vec<TaggedSentence>) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let chunks = self.context.packer.pack(document, pending, None)?;
        document.chunks.extend(chunks);
        pending.clear();
        Ok(())
    }

    /// Chunk the cleaned elements into `document`.
    fn chunk_elements(&self, document: &mut Document) -> Result<ChunkingSummary> {
        let mut pending: Vec<TaggedSentence> = Vec::new();
        let mut summary = ChunkingSummary::default();

        for element in &self.elements {
            let page = element.raw.page_number;

            match element.raw.category() {
                ElementCategory::Textual => {
                    match self.context.segmenter.segment(&element.raw.text, page) {
                        SegmentationOutcome::Sentences(sentences) => pending.extend(sentences),
                        SegmentationOutcome::Failed { .. } => summary.failed_segments += 1,
                    }
                }
                ElementCategory::Table => {
                    let Some(grid) = &element.grid else {
                        continue;
                    };

                    // Text before the table never shares a chunk with it
                    self.flush(document, &mut pending)?;

                    let table = self.tables.extract(grid.clone());
                    let outcome = self.tables.sentences(&table, page);
                    if outcome.is_failed() {
                        summary.failed_segments += 1;
                    }

                    let link = table.link();
                    let chunks =
                        self.context
                            .packer
                            .pack(document, &outcome.into_sentences(), Some(&link))?;
                    document.chunks.extend(chunks);
                    summary.tables += 1;
                }
                ElementCategory::Image | ElementCategory::Other => {}
            }
        }

        self.flush(document, &mut pending)?;
        Ok(summary)
    }
}

#[derive(Debug, Default)]
struct ChunkingSummary {
    tables: usize,
    failed_segments: usize,
}

impl DocumentProcessor for PdfProcessor {
    fn document(&self) -> &Document {
        &self.document
    }

    fn state(&self) -> ProcessorState {
        self.state
    }

    fn partition(&mut self) -> Result<()> {
        self.expect_state(ProcessorState::Created)?;

        let elements = self
            .context
            .partitioner
            .partition(&self.document.path, &self.context.languages)?;

        info!(
            "Partitioned PDF {:?} into {} elements",
            self.document.path,
            elements.len()
        );

        self.elements = elements
            .into_iter()
            .map(|raw| ProcessedElement { raw, grid: None })
            .collect();
        self.state = ProcessorState::Partitioned;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.expect_state(ProcessorState::Partitioned)?;

        self.elements = std::mem::take(&mut self.elements)
            .into_iter()
            .map(|element| Self::clean_element(element.raw))
            .collect();

        let tables = self.elements.iter().filter(|e| e.grid.is_some()).count();
        debug!("Cleaned {} elements ({} tables)", self.elements.len(), tables);

        self.state = ProcessorState::Cleaned;
        Ok(())
    }

    fn perform_chunking(&mut self) -> Result<()> {
        self.expect_state(ProcessorState::Cleaned)?;

        // Chunks and the id counter are committed only when every element packs
        let mut document = self.document.clone();
        let summary = self.chunk_elements(&mut document)?;
        let created = document.chunks.len() - self.document.chunks.len();
        self.document = document;
        self.context.metrics.add_chunks_created(created as u64);

        if summary.failed_segments > 0 {
            warn!(
                "{} elements of {} could not be segmented",
                summary.failed_segments, self.document.filename
            );
        }
        info!(
            "📦 Chunked {}: {} chunks ({} tables)",
            self.document.filename,
            self.document.chunks.len(),
            summary.tables
        );

        self.state = ProcessorState::Chunked;
        Ok(())
    }

    fn export_chunked_document(&mut self, output: Option<&Path>) -> Result<Option<PathBuf>> {
        if self.document.chunks.is_empty() {
            error!("Cannot export chunks to json. No chunks found. Please call process() first.");
            return Ok(None);
        }

        if !matches!(self.state, ProcessorState::Chunked | ProcessorState::Exported) {
            return Err(IngestError::InvalidState {
                expected: ProcessorState::Chunked.as_str(),
                actual: self.state.as_str(),
            });
        }

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| export::default_export_path(&self.document.path));

        export::write_chunks_json(&self.document.chunks, &path)?;
        self.state = ProcessorState::Exported;
        Ok(Some(path))
    }
}
