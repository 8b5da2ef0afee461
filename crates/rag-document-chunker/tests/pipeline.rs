//! End-to-end chunking of a pre-partitioned document

use rag_document_chunker::document::packer::ChunkPacker;
use rag_document_chunker::nlp::{SentenceSegmenterAdapter, Tokenizer, UnicodeSentenceSegmenter};
use rag_document_chunker::partition::ElementsFilePartitioner;
use rag_document_chunker::utils::Metrics;
use rag_document_chunker::worker::{to_bulk_ndjson, ProcessorState};
use rag_document_chunker::{Chunk, IngestError, ProcessingContext, ProcessorFactory, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// One token per whitespace separated word; ids index into the text's words.
struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn token_count(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        // Words are "wN", so the id is N
        text.split_whitespace()
            .map(|w| {
                w.trim_start_matches('w')
                    .parse::<u32>()
                    .map_err(|e| IngestError::Tokenizer(e.to_string()))
            })
            .collect()
    }

    fn detokenize(&self, tokens: &[u32]) -> Result<String> {
        Ok(tokens
            .iter()
            .map(|t| format!("w{t}"))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

const ELEMENTS: &str = r#"[
    {"type": "Title", "text": "Regulament de organizare", "metadata": {"page_number": 1}},
    {"type": "NarrativeText", "text": "Prezentul regulament stabileste regulile interne. Se aplica tuturor angajatilor.", "metadata": {"page_number": 1}},
    {"type": "Table", "text": "Functie Persoana Director Ion Popescu", "metadata": {
        "page_number": 2,
        "text_as_html": "<table><thead><tr><th>Functie</th><th>Persoana</th></tr></thead><tbody><tr><td>Director</td><td>Ion Popescu</td></tr></tbody></table>"
    }},
    {"type": "Image", "text": "", "metadata": {"page_number": 2}},
    {"type": "NarrativeText", "text": "Dispozitii finale ......... 9", "metadata": {"page_number": 3}},
    {"type": "Footer", "text": "Pagina 3", "metadata": {"page_number": 3}}
]"#;

fn context(max_tokens: usize) -> ProcessingContext {
    ProcessingContext {
        partitioner: Arc::new(ElementsFilePartitioner),
        segmenter: SentenceSegmenterAdapter::new(Arc::new(UnicodeSentenceSegmenter)),
        packer: ChunkPacker::new(Arc::new(WhitespaceTokenizer), max_tokens).unwrap(),
        languages: vec!["ron".to_string()],
        metrics: Metrics::new(),
    }
}

fn write_document(dir: &Path, name: &str, elements: &str) -> std::path::PathBuf {
    let pdf = dir.join(name);
    fs::write(&pdf, b"%PDF-1.7").unwrap();
    fs::write(dir.join(format!("{name}.json")), elements).unwrap();
    pdf
}

#[test]
fn test_process_export_and_bulk() {
    let dir = TempDir::new().unwrap();
    let pdf = write_document(dir.path(), "Regulament%20intern.pdf", ELEMENTS);

    let mut processor =
        ProcessorFactory::for_path(&pdf, "https://docs.example/regulament.pdf", context(512)).unwrap();
    processor.process().unwrap();

    let chunks = processor.chunks().to_vec();
    assert_eq!(chunks.len(), 3);

    // Text before the table
    assert_eq!(
        chunks[0].text,
        "Regulament de organizare Prezentul regulament stabileste regulile interne. Se aplica tuturor angajatilor."
    );
    assert_eq!(chunks[0].page_number, 1);
    assert!(chunks[0].table_id.is_none());

    // The table alone
    assert_eq!(chunks[1].text, "Functie ; Persoana ; Director ; Ion Popescu");
    assert_eq!(chunks[1].page_number, 2);
    assert_eq!(
        chunks[1].table_text.as_deref(),
        Some("| Functie | Persoana |\n|:--|:--|\n| Director | Ion Popescu |")
    );
    assert_eq!(chunks[1].table_id.as_ref().map(String::len), Some(64));

    // Text after the table, with the leader stripped; the footer is ignored
    assert_eq!(chunks[2].text, "Dispozitii finale");
    assert_eq!(chunks[2].page_number, 3);

    for chunk in &chunks {
        assert_eq!(chunk.filename, "Regulament intern.pdf");
        assert_eq!(chunk.doc_type, "pdf");
        assert_eq!(chunk.url, "https://docs.example/regulament.pdf");
    }

    let written = processor.export_chunked_document(None).unwrap().unwrap();
    assert_eq!(written, dir.path().join("Regulament%20intern.json"));
    assert_eq!(processor.state(), ProcessorState::Exported);

    let exported: Vec<Chunk> = serde_json::from_str(&fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(exported, chunks);

    let records = processor.format_data("regulamente").unwrap();
    let body = to_bulk_ndjson(&records).unwrap();
    assert_eq!(body.lines().count(), 6);
    assert!(body.starts_with(r#"{"index":{"_index":"regulamente","_id":""#));
}

#[test]
fn test_rerun_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let pdf = write_document(dir.path(), "act.pdf", ELEMENTS);

    let run = || {
        let mut processor = ProcessorFactory::for_path(&pdf, "u", context(8)).unwrap();
        processor.process().unwrap();
        processor.chunks().to_vec()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_small_budget_keeps_every_chunk_within_limit() {
    let dir = TempDir::new().unwrap();
    let long_sentence = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let elements = format!(
        r#"[
            {{"type": "NarrativeText", "text": "w1 w2 w3.", "metadata": {{"page_number": 1}}}},
            {{"type": "NarrativeText", "text": "{long_sentence}", "metadata": {{"page_number": 2}}}},
            {{"type": "NarrativeText", "text": "w7 w8.", "metadata": {{"page_number": 3}}}}
        ]"#
    );
    let pdf = write_document(dir.path(), "lung.pdf", &elements);

    let mut processor = ProcessorFactory::for_path(&pdf, "u", context(16)).unwrap();
    processor.process().unwrap();
    let chunks = processor.chunks();

    let sizes: Vec<usize> = chunks.iter().map(|c| c.text.split_whitespace().count()).collect();
    assert_eq!(sizes, vec![3, 16, 16, 8, 2]);

    // The page only moves when a chunk is flushed, so the tail after the
    // split stays on the page of the long sentence
    let pages: Vec<u32> = chunks.iter().map(|c| c.page_number).collect();
    assert_eq!(pages, vec![1, 2, 2, 2, 2]);

    let ids: HashSet<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), chunks.len());
}

#[test]
fn test_document_without_text_exports_nothing() {
    let dir = TempDir::new().unwrap();
    let pdf = write_document(
        dir.path(),
        "scan.pdf",
        r#"[{"type": "Image", "text": "", "metadata": {"page_number": 1}}]"#,
    );

    let mut processor = ProcessorFactory::for_path(&pdf, "u", context(512)).unwrap();
    processor.process().unwrap();

    assert!(processor.chunks().is_empty());
    assert!(processor.format_data("documents").is_none());
    assert_eq!(processor.export_chunked_document(None).unwrap(), None);
    assert!(!dir.path().join("scan.json").exists());
}

#[test]
fn test_missing_elements_file_fails() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("absent.pdf");

    let mut processor = ProcessorFactory::for_path(&pdf, "u", context(512)).unwrap();
    assert!(matches!(processor.process(), Err(IngestError::Partition(_))));
}
