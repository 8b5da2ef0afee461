//! Output formats for chunked documents: bulk index records and JSON files.

use crate::document::chunk::Chunk;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Chunk plus the routing fields of a bulk index request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRecord {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub chunk: Chunk,
}

#[derive(Serialize)]
struct BulkAction<'a> {
    index: BulkTarget<'a>,
}

#[derive(Serialize)]
struct BulkTarget<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
}

/// One record per chunk, or `None` when there is nothing to index.
pub fn format_data(chunks: &[Chunk], index_name: &str) -> Option<Vec<BulkRecord>> {
    if chunks.is_empty() {
        return None;
    }

    Some(
        chunks
            .iter()
            .map(|chunk| BulkRecord {
                index: index_name.to_string(),
                id: chunk.id.clone(),
                chunk: chunk.clone(),
            })
            .collect(),
    )
}

/// Render records as a `_bulk` request body: an action line followed by the
/// chunk source, newline terminated.
pub fn to_bulk_ndjson(records: &[BulkRecord]) -> Result<String> {
    let mut body = String::new();

    for record in records {
        let action = BulkAction {
            index: BulkTarget {
                index: &record.index,
                id: &record.id,
            },
        };
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&record.chunk)?);
        body.push('\n');
    }

    Ok(body)
}

/// `<source dir>/<source stem>.json`
pub fn default_export_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}.json", stem))
}

/// Write chunks as a pretty JSON array with 4-space indentation.
pub fn write_chunks_json(chunks: &[Chunk], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    chunks.serialize(&mut serializer)?;
    writer.flush()?;

    info!("Saved {} chunks to {:?}", chunks.len(), path);
    Ok(())
}
