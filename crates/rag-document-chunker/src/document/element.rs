use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type tags treated as running text.
const TEXTUAL_TYPES: &[&str] = &[
    "Title",
    "Text",
    "UncategorizedText",
    "NarrativeText",
    "BulletedText",
    "Paragraph",
    "Abstract",
    "Field-Name",
    "Value",
    "Link",
    "CompositeElement",
    "FigureCaption",
    "Caption",
    "ListItem",
    "List-item",
    "Address",
    "EmailAddress",
    "Formula",
    "Header",
    "Headline",
    "Subheadline",
    "Page-header",
    "Section-header",
    "Page-footer",
];

const IMAGE_TYPES: &[&str] = &["Image", "Picture"];

const TABLE_TYPES: &[&str] = &["Table"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    Textual,
    Table,
    Image,
    Other,
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementCategory::Textual => "Textual",
            ElementCategory::Table => "Table",
            ElementCategory::Image => "Image",
            ElementCategory::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Map a partitioner element type tag to its category. Unknown tags are `Other`.
pub fn classify(element_type: &str) -> ElementCategory {
    if TEXTUAL_TYPES.contains(&element_type) {
        ElementCategory::Textual
    } else if TABLE_TYPES.contains(&element_type) {
        ElementCategory::Table
    } else if IMAGE_TYPES.contains(&element_type) {
        ElementCategory::Image
    } else {
        ElementCategory::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub layout_width: Option<f64>,
    #[serde(default)]
    pub layout_height: Option<f64>,
}

/// One element of a partitioned document, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    pub category: String,
    pub text: String,
    pub page_number: u32,
    /// HTML markup of a table element
    #[serde(default)]
    pub table_html: Option<String>,
    /// Set when the partitioner extracted table cells individually
    #[serde(default)]
    pub table_as_cells: bool,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl RawElement {
    pub fn new(category: impl Into<String>, text: impl Into<String>, page_number: u32) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            page_number,
            table_html: None,
            table_as_cells: false,
            coordinates: None,
        }
    }

    pub fn table(text: impl Into<String>, html: impl Into<String>, page_number: u32) -> Self {
        Self {
            table_html: Some(html.into()),
            ..Self::new("Table", text, page_number)
        }
    }

    pub fn category(&self) -> ElementCategory {
        classify(&self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textual_types() {
        for tag in ["Title", "NarrativeText", "ListItem", "Page-header", "Formula"] {
            assert_eq!(classify(tag), ElementCategory::Textual, "{}", tag);
        }
    }

    #[test]
    fn test_table_and_image_types() {
        assert_eq!(classify("Table"), ElementCategory::Table);
        assert_eq!(classify("Image"), ElementCategory::Image);
        assert_eq!(classify("Picture"), ElementCategory::Image);
    }

    #[test]
    fn test_unmapped_types_are_other() {
        assert_eq!(classify("PageBreak"), ElementCategory::Other);
        assert_eq!(classify("Footer"), ElementCategory::Other);
        assert_eq!(classify(""), ElementCategory::Other);
        assert_eq!(classify("title"), ElementCategory::Other);
    }

    #[test]
    fn test_table_constructor() {
        let element = RawElement::table("a b", "<table></table>", 3);
        assert_eq!(element.category(), ElementCategory::Table);
        assert_eq!(element.page_number, 3);
        assert!(element.table_html.is_some());
    }
}
