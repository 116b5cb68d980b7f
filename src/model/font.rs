//! Font state carried by text draw operations.

use serde::{Deserialize, Serialize};

/// Standard font family. Both map onto PDF base-14 fonts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Helvetica,
    Courier,
}

/// Font weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// The complete font selection for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontState {
    pub family: FontFamily,
    pub size_pt: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontState {
    /// Regular font of the given family and size.
    pub fn new(family: FontFamily, size_pt: f32) -> Self {
        Self {
            family,
            size_pt,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
        }
    }

    /// Regular Helvetica at the given size.
    pub fn helvetica(size_pt: f32) -> Self {
        Self::new(FontFamily::Helvetica, size_pt)
    }

    /// Same font at a different size.
    pub fn with_size(mut self, size_pt: f32) -> Self {
        self.size_pt = size_pt;
        self
    }

    /// Same font with the given weight.
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Same font with the given slant.
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Bold variant.
    pub fn bold(self) -> Self {
        self.with_weight(FontWeight::Bold)
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.style == FontStyle::Italic
    }

    /// PDF base font name for this state, e.g. `Helvetica-BoldOblique`.
    pub fn base_font_name(&self) -> &'static str {
        match (self.family, self.is_bold(), self.is_italic()) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }
}

impl Default for FontState {
    fn default() -> Self {
        Self::helvetica(11.0)
    }
}
