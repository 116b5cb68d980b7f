//! JSON rendering for laid-out documents.

use crate::error::{Error, Result};
use crate::model::Document;
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Document dump with the generator and page count up front.
#[derive(Serialize)]
struct JsonExport<'a> {
    generator: String,
    page_count: u32,
    #[serde(flatten)]
    document: &'a Document,
}

/// Convert a document to JSON.
///
/// Image bytes are not serialized; resources carry only their format and
/// dimensions.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let export = JsonExport {
        generator: format!("quizpdf {}", env!("CARGO_PKG_VERSION")),
        page_count: doc.page_count(),
        document: doc,
    };
    let mut out = Vec::new();
    match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(&mut out, &export),
        JsonFormat::Compact => serde_json::to_writer(&mut out, &export),
    }
    .map_err(|e| Error::Render(format!("cannot serialize \"{}\": {}", doc.metadata.title, e)))?;

    String::from_utf8(out).map_err(|e| Error::Render(e.to_string()))
}
