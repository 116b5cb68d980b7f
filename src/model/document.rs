//! Document-level types.

use super::{FontState, LayoutStats, Resource};
use crate::backend::metrics;
use crate::error::{Error, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A laid-out quiz document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, template, totals)
    pub metadata: Metadata,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// Embedded images, keyed by the id draw operations refer to
    pub resources: BTreeMap<String, Resource>,

    /// Layout statistics
    pub stats: LayoutStats,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            pages: Vec::new(),
            resources: BTreeMap::new(),
            stats: LayoutStats::default(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Add a resource to the document.
    pub fn add_resource(&mut self, id: String, resource: Resource) {
        self.resources.insert(id, resource);
    }

    /// Get a resource by ID.
    pub fn get_resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Serialize to PDF bytes.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        crate::render::to_pdf(self)
    }

    /// Write the document as a PDF file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_pdf_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        log::debug!("Saved {} pages to {}", self.page_count(), path.as_ref().display());
        Ok(())
    }

    /// PDF as a `data:` URI, suitable for an embedded viewer.
    pub fn preview(&self) -> Result<String> {
        let bytes = self.to_pdf_bytes()?;
        Ok(format!(
            "data:application/pdf;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ))
    }

    /// Default download name, `quiz-YYYY-MM-DD.pdf`, dated by creation time.
    pub fn default_filename(&self) -> String {
        let date = self.metadata.created.unwrap_or_else(Utc::now);
        format!("quiz-{}.pdf", date.format("%Y-%m-%d"))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title (the quiz name)
    pub title: String,

    /// Display name of the template used
    pub template: String,

    /// Generator credit
    pub producer: String,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Total number of pages
    pub page_count: u32,

    /// Number of questions laid out
    pub question_count: u32,

    /// Sum of question points
    pub total_points: u32,
}

/// A single page: draw operations in paint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in millimetres
    pub width: f32,

    /// Page height in millimetres
    pub height: f32,

    /// Draw operations
    pub ops: Vec<DrawOp>,

    /// Numbers of the questions that start on this page
    pub questions: Vec<u32>,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ops: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Append a draw operation.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Text operations in paint order.
    pub fn text_ops(&self) -> impl Iterator<Item = (&str, f32, f32, &FontState)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, x, y, font, .. } => Some((text.as_str(), *x, *y, font)),
            _ => None,
        })
    }

    /// Check if the page has no draw operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Reconstruct the page text, one output line per laid-out line.
    ///
    /// A text operation continues the current line when it starts to the
    /// right of the previous one; a visible gap becomes a space.
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut prev: Option<(f32, f32)> = None;

        for (text, x, _, font) in self.text_ops() {
            let end = x + metrics::text_width(text, font);
            match (prev, lines.last_mut()) {
                (Some((prev_x, prev_end)), Some(line)) if x > prev_x => {
                    if x - prev_end > 0.5 && !line.ends_with(' ') {
                        line.push(' ');
                    }
                    line.push_str(text);
                }
                _ => lines.push(text.to_string()),
            }
            prev = Some((x, end));
        }

        lines
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A primitive draw operation. Coordinates are millimetres from the top-left
/// corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        font: FontState,
        #[serde(default)]
        underline: bool,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        filled: bool,
    },
    Image {
        resource_id: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawOp {
    /// The text of a text operation.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Reject a page index the document does not have.
pub(crate) fn check_page(index: usize, page_count: usize) -> Result<()> {
    if index >= page_count {
        return Err(Error::PageOutOfRange(index as u32 + 1, page_count as u32));
    }
    Ok(())
}
