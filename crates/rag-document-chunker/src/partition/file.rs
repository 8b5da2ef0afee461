use super::unstructured::parse_elements;
use super::Partitioner;
use crate::document::element::RawElement;
use crate::utils::error::{IngestError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads elements produced ahead of time by the partition service, stored
/// next to the source as `<file>.json` or `<stem>.elements.json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementsFilePartitioner;

impl ElementsFilePartitioner {
    pub fn candidates(path: &Path) -> Vec<PathBuf> {
        let mut with_json = path.as_os_str().to_owned();
        with_json.push(".json");

        let mut candidates = vec![PathBuf::from(with_json)];
        if let Some(stem) = path.file_stem() {
            let mut name = stem.to_owned();
            name.push(".elements.json");
            candidates.push(path.with_file_name(name));
        }
        candidates
    }
}

impl Partitioner for ElementsFilePartitioner {
    fn partition(&self, path: &Path, _languages: &[String]) -> Result<Vec<RawElement>> {
        let source = Self::candidates(path)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                IngestError::Partition(format!("no elements file found for {:?}", path))
            })?;

        info!("Loading partitioned elements from {:?}", source);
        let body = fs::read_to_string(&source)?;
        let elements = parse_elements(&body)?;

        debug!("Loaded {} elements", elements.len());
        Ok(elements)
    }
}
