//! Unstructured partition service client and its element wire format.

use super::Partitioner;
use crate::config::PartitionerConfig;
use crate::document::element::{Coordinates, RawElement};
use crate::utils::error::{IngestError, Result};
use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Image blocks the service should crop out of the page.
const IMAGE_BLOCK_TYPES: &str = r#"["Image", "Table"]"#;

/// Element as returned by the partition endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnstructuredElement {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub element_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: ElementMetadata,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ElementMetadata {
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub text_as_html: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub table_as_cells: Option<serde_json::Value>,
}

impl From<UnstructuredElement> for RawElement {
    fn from(element: UnstructuredElement) -> Self {
        let metadata = element.metadata;
        RawElement {
            category: element.element_type,
            text: element.text,
            page_number: metadata.page_number.unwrap_or(1),
            table_html: metadata.text_as_html,
            table_as_cells: metadata.table_as_cells.is_some_and(|v| !v.is_null()),
            coordinates: metadata.coordinates,
        }
    }
}

/// Parse a partition response body into elements, preserving order.
pub fn parse_elements(body: &str) -> Result<Vec<RawElement>> {
    let elements: Vec<UnstructuredElement> = serde_json::from_str(body)?;
    Ok(elements.into_iter().map(RawElement::from).collect())
}

pub struct UnstructuredApiPartitioner {
    client: Client,
    url: String,
    api_key: Option<String>,
    strategy: String,
}

impl UnstructuredApiPartitioner {
    pub fn new(config: &PartitionerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            strategy: config.strategy.clone(),
        })
    }

    fn form(&self, path: &Path, languages: &[String]) -> Result<multipart::Form> {
        let mut form = multipart::Form::new()
            .file("files", path)?
            .text("strategy", self.strategy.clone())
            .text("pdf_infer_table_structure", "true")
            .text("extract_image_block_types", IMAGE_BLOCK_TYPES);

        for language in languages {
            form = form.text("languages", language.clone());
        }

        Ok(form)
    }
}

impl Partitioner for UnstructuredApiPartitioner {
    fn partition(&self, path: &Path, languages: &[String]) -> Result<Vec<RawElement>> {
        info!("Partitioning {:?} via {}", path, self.url);

        let mut request = self.client.post(&self.url).multipart(self.form(path, languages)?);
        if let Some(key) = &self.api_key {
            request = request.header("unstructured-api-key", key);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(IngestError::Partition(format!(
                "partition service returned {}: {}",
                status, body
            )));
        }

        let elements = parse_elements(&body)
            .map_err(|e| IngestError::Partition(format!("unreadable partition response: {}", e)))?;

        debug!("Partition service returned {} elements", elements.len());
        Ok(elements)
    }
}
