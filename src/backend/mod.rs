//! Document backend abstraction layer.
//!
//! The composer talks to a [`DocumentBackend`] for every drawing primitive,
//! never to a concrete output format. [`RecordingBackend`] records the
//! primitives into a [`Document`](crate::model::Document), which the writers
//! in [`render`](crate::render) turn into PDF, JSON or text.

pub mod metrics;
mod recording;

pub use recording::RecordingBackend;

use crate::error::Result;
use crate::layout::{Point, Rect};
use crate::model::{Document, FontState, LayoutStats, Metadata, Resource};

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStyle {
    /// Outline only
    Stroke,
    /// Outline and interior
    Fill,
}

/// Drawing capabilities the layout engine needs.
///
/// Coordinates are millimetres from the top-left page corner. Implementations
/// own the document being built; the composer has exclusive use of the
/// backend for the duration of one generation.
pub trait DocumentBackend {
    /// Page size (width, height) in millimetres.
    fn page_size(&self) -> (f32, f32);

    /// Number of pages created so far.
    fn page_count(&self) -> usize;

    /// Zero-based index of the page drawing goes to.
    fn current_page(&self) -> usize;

    /// Append a page and make it current.
    fn new_page(&mut self);

    /// Make an existing page current (used by the footer pass).
    fn set_page(&mut self, index: usize) -> Result<()>;

    /// Set the pen position for the next [`line_to`](Self::line_to).
    fn move_to(&mut self, point: Point);

    /// Stroke a line from the pen position and move the pen to `point`.
    fn line_to(&mut self, point: Point, width: f32);

    /// Draw text with its baseline starting at `at`.
    fn draw_text(&mut self, text: &str, at: Point, font: &FontState, underline: bool);

    /// Draw a circle.
    fn draw_circle(&mut self, center: Point, radius: f32, style: ShapeStyle);

    /// Place an image in `rect`.
    fn add_image(&mut self, image: &Resource, rect: Rect);

    /// Width of `text` in millimetres.
    fn measure_text(&self, text: &str, font: &FontState) -> f32 {
        metrics::text_width(text, font)
    }

    /// Note that question `number` starts on the current page.
    fn mark_question(&mut self, _number: u32) {}

    /// Close the document.
    fn finish(self: Box<Self>, metadata: Metadata, stats: LayoutStats) -> Result<Document>;
}
