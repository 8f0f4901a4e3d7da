//! Role-tagged content blocks handed over by a page extractor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// A unit of extracted page content with its semantic kind already tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Semantic kind
    pub kind: BlockKind,

    /// Extracted text
    #[serde(default)]
    pub text: String,

    /// Recognized formula or table markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,

    /// Image file backing the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    /// Source page (0-indexed)
    #[serde(default)]
    pub page: u32,

    /// Bounding box `[x0, y0, x1, y1]` in page points
    #[serde(default)]
    pub bbox: [f32; 4],

    /// Extraction confidence (0.0 - 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Free-form extractor metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

fn default_confidence() -> f32 {
    1.0
}

impl ContentBlock {
    /// Create a block of the given kind with text.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            latex: None,
            image_path: None,
            page: 0,
            bbox: [0.0; 4],
            confidence: 1.0,
            metadata: Map::new(),
        }
    }

    /// Builder: attach recognized markup.
    pub fn with_latex(mut self, latex: impl Into<String>) -> Self {
        self.latex = Some(latex.into());
        self
    }

    /// Builder: attach an image.
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Heading level from `metadata.level`, defaulting to 1.
    pub fn heading_level(&self) -> u8 {
        self.metadata
            .get("level")
            .and_then(Value::as_u64)
            .map(|l| l.clamp(1, 9) as u8)
            .unwrap_or(1)
    }

    /// Parse a JSON array of blocks.
    pub fn from_json_list(json: &str) -> crate::Result<Vec<ContentBlock>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Semantic kind of a [`ContentBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Body text
    Text,
    /// Section heading
    Heading,
    /// Displayed equation
    Equation,
    /// Table
    Table,
    /// Figure
    Figure,
    /// Reference-list entry
    Reference,
    /// Abstract body
    Abstract,
    /// Document title
    Title,
    /// Author line
    Author,
}
