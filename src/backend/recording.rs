//! In-memory backend that records draw operations page by page.

use super::{DocumentBackend, ShapeStyle};
use crate::error::Result;
use crate::layout::{Point, Rect};
use crate::model::{check_page, Document, DrawOp, FontState, LayoutStats, Metadata, Page, Resource};
use std::collections::BTreeMap;

/// Backend producing a [`Document`] of recorded draw operations.
#[derive(Debug)]
pub struct RecordingBackend {
    width: f32,
    height: f32,
    pages: Vec<Page>,
    current: usize,
    pen: Option<Point>,
    resources: BTreeMap<String, Resource>,
}

impl RecordingBackend {
    /// Create a backend with one empty page of the given size (millimetres).
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: vec![Page::new(1, width, height)],
            current: 0,
            pen: None,
            resources: BTreeMap::new(),
        }
    }

    /// A4 portrait.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    /// Pages recorded so far.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.push(op);
        }
    }

    /// Reuse the id of an identical image already embedded.
    fn resource_id(&mut self, image: &Resource) -> String {
        if let Some((id, _)) = self.resources.iter().find(|(_, r)| r.data == image.data) {
            return id.clone();
        }
        let id = format!("img{}", self.resources.len() + 1);
        self.resources.insert(id.clone(), image.clone());
        id
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::a4()
    }
}

impl DocumentBackend for RecordingBackend {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn new_page(&mut self) {
        let number = self.pages.len() as u32 + 1;
        self.pages.push(Page::new(number, self.width, self.height));
        self.current = self.pages.len() - 1;
        self.pen = None;
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        check_page(index, self.pages.len())?;
        self.current = index;
        self.pen = None;
        Ok(())
    }

    fn move_to(&mut self, point: Point) {
        self.pen = Some(point);
    }

    fn line_to(&mut self, point: Point, width: f32) {
        match self.pen {
            Some(from) => self.push(DrawOp::Line {
                x1: from.x,
                y1: from.y,
                x2: point.x,
                y2: point.y,
                width,
            }),
            None => log::debug!("line_to without a pen position; moving only"),
        }
        self.pen = Some(point);
    }

    fn draw_text(&mut self, text: &str, at: Point, font: &FontState, underline: bool) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            text: text.to_string(),
            x: at.x,
            y: at.y,
            font: *font,
            underline,
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f32, style: ShapeStyle) {
        self.push(DrawOp::Circle {
            cx: center.x,
            cy: center.y,
            radius,
            filled: style == ShapeStyle::Fill,
        });
    }

    fn add_image(&mut self, image: &Resource, rect: Rect) {
        let resource_id = self.resource_id(image);
        self.push(DrawOp::Image {
            resource_id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
    }

    fn mark_question(&mut self, number: u32) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.questions.push(number);
        }
    }

    fn finish(self: Box<Self>, mut metadata: Metadata, mut stats: LayoutStats) -> Result<Document> {
        let page_count = self.pages.len() as u32;
        metadata.page_count = page_count;
        stats.page_count = page_count;
        Ok(Document {
            metadata,
            pages: self.pages,
            resources: self.resources,
            stats,
        })
    }
}
