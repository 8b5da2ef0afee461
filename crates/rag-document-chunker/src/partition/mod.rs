pub mod file;
pub mod unstructured;

use crate::config::{PartitionerConfig, PartitionerKind};
use crate::document::element::RawElement;
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

pub use file::ElementsFilePartitioner;
pub use unstructured::{UnstructuredApiPartitioner, UnstructuredElement};

/// Layout analysis port: file in, ordered elements out.
#[cfg_attr(test, automock)]
pub trait Partitioner: Send + Sync {
    fn partition(&self, path: &Path, languages: &[String]) -> Result<Vec<RawElement>>;
}

/// Build the partitioner selected in configuration.
pub fn from_config(config: &PartitionerConfig) -> Result<Arc<dyn Partitioner>> {
    let partitioner: Arc<dyn Partitioner> = match config.kind {
        PartitionerKind::Api => Arc::new(UnstructuredApiPartitioner::new(config)?),
        PartitionerKind::File => Arc::new(ElementsFilePartitioner),
    };
    Ok(partitioner)
}
