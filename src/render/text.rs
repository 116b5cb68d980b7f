//! Plain text rendering for laid-out documents.

use crate::error::Result;
use crate::model::Document;

/// Convert a document to plain text, one section per page.
pub fn to_text(doc: &Document) -> Result<String> {
    let mut output = String::new();
    for page in &doc.pages {
        if !output.is_empty() {
            output.push_str("\n\n");
        }
        output.push_str(&format!("--- Page {} ---\n", page.number));
        output.push_str(&page.plain_text());
    }
    Ok(output.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawOp, FontState, Page};

    fn text_op(text: &str, y: f32) -> DrawOp {
        DrawOp::Text {
            text: text.to_string(),
            x: 20.0,
            y,
            font: FontState::default(),
            underline: false,
        }
    }

    #[test]
    fn test_to_text() {
        let mut doc = Document::new();
        let mut first = Page::new(1, 210.0, 297.0);
        first.push(text_op("Hello, world!", 20.0));
        let mut second = Page::new(2, 210.0, 297.0);
        second.push(text_op("Second page.", 20.0));
        doc.add_page(first);
        doc.add_page(second);

        let result = to_text(&doc).unwrap();
        assert_eq!(
            result,
            "--- Page 1 ---\nHello, world!\n\n--- Page 2 ---\nSecond page."
        );
    }
}
