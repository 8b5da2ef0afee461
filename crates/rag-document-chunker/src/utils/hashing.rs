use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a UTF-8 string.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Chunk id: `sha256_hex(filename)-chunk_number`.
pub fn chunk_id(filename: &str, chunk_number: usize) -> String {
    format!("{}-{}", sha256_hex(filename), chunk_number)
}

/// Content-addressed id of a table's markdown rendering.
pub fn table_id(table_markdown: &str) -> String {
    sha256_hex(table_markdown)
}
