//! Export of a finished document to bytes in a chosen format.

use crate::error::{Error, Result};
use crate::model::{Document, LayoutStats, Metadata};
use crate::render::{self, JsonFormat};
use std::path::Path;
use std::str::FromStr;

/// Output format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// PDF file
    #[default]
    Pdf,

    /// JSON dump of pages and draw operations
    Json,

    /// Plain text, one section per page
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(Error::Configuration(format!(
                "unknown export format: {} (expected pdf, json or text)",
                other
            ))),
        }
    }
}

/// Result of exporting a document.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Encoded output
    pub bytes: Vec<u8>,

    /// Document metadata
    pub metadata: Metadata,

    /// Layout statistics
    pub stats: LayoutStats,

    /// MIME type of the output
    pub mime_type: &'static str,

    /// Suggested download name
    pub file_name: String,
}

impl ExportResult {
    /// Write the bytes to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode `doc` as `format`.
pub fn export(doc: &Document, format: ExportFormat) -> Result<ExportResult> {
    let bytes = match format {
        ExportFormat::Pdf => render::to_pdf(doc)?,
        ExportFormat::Json => render::to_json(doc, JsonFormat::Pretty)?.into_bytes(),
        ExportFormat::Text => render::to_text(doc)?.into_bytes(),
    };

    let stem = doc.default_filename();
    let stem = stem.strip_suffix(".pdf").unwrap_or(&stem);
    log::debug!("Exported {} bytes as {}", bytes.len(), format.extension());

    Ok(ExportResult {
        bytes,
        metadata: doc.metadata.clone(),
        stats: doc.stats.clone(),
        mime_type: format.mime_type(),
        file_name: format!("{}.{}", stem, format.extension()),
    })
}
