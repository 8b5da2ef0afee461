use crate::utils::error::{IngestError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A source file placed in the upload directory for the duration of one
/// processing run. The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct ScopedUpload {
    path: PathBuf,
}

impl ScopedUpload {
    /// Write `bytes` as `<upload_dir>/<filename>`.
    pub fn from_bytes(upload_dir: &Path, filename: &str, bytes: &[u8]) -> Result<Self> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| IngestError::InvalidConfig(format!("invalid upload name {:?}", filename)))?;

        fs::create_dir_all(upload_dir)?;
        let path = upload_dir.join(name);
        fs::write(&path, bytes)?;

        debug!("Stored upload {:?} ({} bytes)", path, bytes.len());
        Ok(Self { path })
    }

    /// Copy an existing file into the upload directory.
    pub fn copy_from(upload_dir: &Path, source: &Path) -> Result<Self> {
        let bytes = fs::read(source)?;
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_bytes(upload_dir, &filename, &bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedUpload {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {:?}", self.path),
            Err(e) => warn!("Failed to remove upload {:?}: {}", self.path, e),
        }
    }
}
