//! Layout primitives and the per-component renderers.
//!
//! All lengths are millimetres measured from the top-left corner of the
//! page; font sizes are points. Text is positioned by its baseline, and a
//! vertical cursor moves down the page as content is placed.

mod estimate;
mod images;
mod option;
mod text;

pub(crate) use estimate::shows_metadata;
pub use estimate::{fixed_line_overhead, PageBreakEstimator};
pub use images::{decode_data_uri, fit_within, ImagePlacement, ImagePlacer, PlacedImage};
pub use option::OptionRenderer;
pub use text::{resolve_run_font, ContentRenderer};

use crate::error::{Error, Result};
use crate::model::{FontFamily, FontState};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Credit line written into every footer.
pub const GENERATOR_CREDIT: &str = concat!("Generated by quizpdf v", env!("CARGO_PKG_VERSION"));

/// A position on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box; `y` is the top edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Paper size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    /// 210 x 297 mm
    #[default]
    A4,
    /// 8.5 x 11 in
    Letter,
    /// Explicit width and height in millimetres
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// (width, height) in millimetres.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => {
                let parsed = other
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)));
                match parsed {
                    Some((width, height)) => Ok(PageSize::Custom { width, height }),
                    None => Err(Error::Configuration(format!(
                        "unknown page size: {} (expected a4, letter or WxH in mm)",
                        s
                    ))),
                }
            }
        }
    }
}

/// Geometry and typography for a generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,

    /// Baseline-to-baseline distance for wrapped text
    pub line_height: f32,
    /// Space after each question
    pub question_spacing: f32,
    /// Indent of question text and images from the left margin
    pub question_indent: f32,
    /// Space between question text and what follows
    pub question_text_gap: f32,

    /// Bubble centre, from the left margin
    pub option_indent: f32,
    /// Option letter, from the bubble centre
    pub option_label_offset: f32,
    /// Option text, from the bubble centre
    pub option_text_offset: f32,
    /// Space after each option
    pub option_gap: f32,
    pub bubble_radius: f32,

    pub font_family: FontFamily,
    pub body_font_pt: f32,
    pub title_font_pt: f32,
    pub subtitle_font_pt: f32,
    pub info_font_pt: f32,
    pub footer_font_pt: f32,

    /// Characters per line assumed by the page-break estimator
    pub chars_per_line: usize,

    pub image_max_height: f32,
    /// Space after an image
    pub image_gap: f32,
    /// Box height used when an image's natural size is unknown
    pub image_fallback_height: f32,

    pub answer_rule_count: usize,
    pub answer_rule_spacing: f32,
    /// Stroke width for rules and bubbles
    pub stroke_width: f32,

    /// Footer baseline, measured up from the bottom edge
    pub footer_offset: f32,
    pub credit: String,
}

impl LayoutOptions {
    /// Create layout options with defaults (A4, 20 mm margins).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paper size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        let (width, height) = size.dimensions();
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the same margin on all four sides.
    pub fn with_margins(mut self, margin: f32) -> Self {
        self.margin_left = margin;
        self.margin_right = margin;
        self.margin_top = margin;
        self.margin_bottom = margin;
        self
    }

    pub fn with_bottom_margin(mut self, margin: f32) -> Self {
        self.margin_bottom = margin;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_question_spacing(mut self, spacing: f32) -> Self {
        self.question_spacing = spacing;
        self
    }

    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    pub fn with_body_font_size(mut self, size_pt: f32) -> Self {
        self.body_font_pt = size_pt;
        self
    }

    pub fn with_chars_per_line(mut self, chars: usize) -> Self {
        self.chars_per_line = chars;
        self
    }

    pub fn with_image_max_height(mut self, height: f32) -> Self {
        self.image_max_height = height;
        self
    }

    /// Set the footer credit line.
    pub fn with_credit(mut self, credit: impl Into<String>) -> Self {
        self.credit = credit.into();
        self
    }

    /// Left edge of the content area.
    pub fn content_left(&self) -> f32 {
        self.margin_left
    }

    /// Right edge of the content area.
    pub fn content_right(&self) -> f32 {
        self.page_width - self.margin_right
    }

    pub fn content_width(&self) -> f32 {
        self.content_right() - self.content_left()
    }

    /// Lowest cursor position content may reach before a page break.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Widest an image may be drawn.
    pub fn image_max_width(&self) -> f32 {
        self.content_width() - self.question_indent
    }

    /// Height the estimator sets aside for a question image.
    pub fn image_reservation(&self) -> f32 {
        self.image_max_height + self.image_gap
    }

    /// Regular body font.
    pub fn body_font(&self) -> FontState {
        FontState::new(self.font_family, self.body_font_pt)
    }

    /// Regular font of the configured family at `size_pt`.
    pub fn font(&self, size_pt: f32) -> FontState {
        FontState::new(self.font_family, size_pt)
    }

    /// Reject geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("page width", self.page_width),
            ("page height", self.page_height),
            ("line height", self.line_height),
            ("body font size", self.body_font_pt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Configuration(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.image_max_width() <= 0.0 {
            return Err(Error::Configuration(format!(
                "margins leave no content width on a {} mm page",
                self.page_width
            )));
        }
        if self.bottom_limit() <= self.margin_top {
            return Err(Error::Configuration(format!(
                "margins leave no content height on a {} mm page",
                self.page_height
            )));
        }
        if self.chars_per_line == 0 {
            return Err(Error::Configuration("chars per line must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 20.0,
            margin_right: 20.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            line_height: 6.0,
            question_spacing: 15.0,
            question_indent: 10.0,
            question_text_gap: 5.0,
            option_indent: 15.0,
            option_label_offset: 5.0,
            option_text_offset: 12.0,
            option_gap: 2.0,
            bubble_radius: 2.0,
            font_family: FontFamily::Helvetica,
            body_font_pt: 11.0,
            title_font_pt: 18.0,
            subtitle_font_pt: 12.0,
            info_font_pt: 10.0,
            footer_font_pt: 8.0,
            chars_per_line: 80,
            image_max_height: 60.0,
            image_gap: 5.0,
            image_fallback_height: 40.0,
            answer_rule_count: 3,
            answer_rule_spacing: 8.0,
            stroke_width: 0.2,
            footer_offset: 10.0,
            credit: GENERATOR_CREDIT.to_string(),
        }
    }
}

/// Font selections with push/pop discipline.
///
/// The bottom entry is the base state and is never popped, so every
/// renderer can restore exactly what its caller had.
#[derive(Debug, Clone)]
pub struct FontStack {
    stack: Vec<FontState>,
}

impl FontStack {
    /// Create a stack holding only `base`.
    pub fn new(base: FontState) -> Self {
        Self { stack: vec![base] }
    }

    /// The active font.
    pub fn current(&self) -> FontState {
        // the base entry is never removed
        self.stack[self.stack.len() - 1]
    }

    /// The font the stack was created with.
    pub fn base(&self) -> FontState {
        self.stack[0]
    }

    /// Make `font` active until the matching [`pop`](Self::pop).
    pub fn push(&mut self, font: FontState) {
        self.stack.push(font);
    }

    /// Restore the previous font. The base entry stays in place.
    pub fn pop(&mut self) -> Option<FontState> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            log::warn!("Unbalanced font pop ignored");
            None
        }
    }

    /// Number of pushed entries above the base.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

/// Mutable layout state for one generation.
#[derive(Debug, Clone)]
pub struct LayoutState {
    /// Zero-based index of the page being filled
    pub page_index: usize,
    /// Vertical cursor on the current page
    pub cursor_y: f32,
    pub fonts: FontStack,
}

impl LayoutState {
    /// Fresh state at the top of the first page.
    pub fn new(options: &LayoutOptions) -> Self {
        Self {
            page_index: 0,
            cursor_y: options.margin_top,
            fonts: FontStack::new(options.body_font()),
        }
    }
}
