use crate::utils::hashing::chunk_id;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One indexable span of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub url: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub filename: String,
    pub page_number: u32,
    pub table_id: Option<String>,
    pub table_text: Option<String>,
}

/// Links every chunk of a table back to the table itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLink {
    pub table_id: String,
    /// Compact markdown of the whole table
    pub table_text: String,
}

/// Per-document identity plus the chunks emitted so far.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    /// Percent-decoded file name
    pub filename: String,
    pub url: String,
    pub doc_type: String,
    pub chunks: Vec<Chunk>,
    chunk_counter: usize,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>, doc_type: impl Into<String>) -> Self {
        let path = path.into();
        let filename = decode_filename(&path);

        Self {
            path,
            filename,
            url: url.into(),
            doc_type: doc_type.into(),
            chunks: Vec::new(),
            chunk_counter: 0,
        }
    }

    /// Number of chunks emitted so far.
    pub fn chunk_counter(&self) -> usize {
        self.chunk_counter
    }

    /// Build the next chunk from accumulated sentence texts.
    pub fn emit_chunk<S: AsRef<str>>(
        &mut self,
        sentences: &[S],
        page_number: u32,
        table: Option<&TableLink>,
    ) -> Chunk {
        self.chunk_counter += 1;

        let text = sentences
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");

        Chunk {
            id: chunk_id(&self.filename, self.chunk_counter),
            text,
            url: self.url.clone(),
            doc_type: self.doc_type.clone(),
            filename: self.filename.clone(),
            page_number,
            table_id: table.map(|t| t.table_id.clone()),
            table_text: table.map(|t| t.table_text.clone()),
        }
    }
}

fn decode_filename(path: &Path) -> String {
    let raw = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    // "Raport%20anual%20%C8%99coala.pdf" -> "Raport anual școala.pdf"
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}
