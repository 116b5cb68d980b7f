//! Output writers for laid-out documents.

mod json;
mod pdf;
mod text;

pub use json::{to_json, JsonFormat};
pub use pdf::{to_pdf, to_winansi_bytes, PdfWriter, PT_PER_MM};
pub use text::to_text;
