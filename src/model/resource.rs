//! Embedded image resources.

use serde::{Deserialize, Serialize};

/// Raster formats accepted in image data URIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Gif,
    Webp,
    #[default]
    Jpeg,
}

impl ImageFormat {
    /// Infer the format from a MIME type; anything unrecognized is JPEG.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("png") {
            ImageFormat::Png
        } else if mime.contains("gif") {
            ImageFormat::Gif
        } else if mime.contains("webp") {
            ImageFormat::Webp
        } else {
            ImageFormat::Jpeg
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Matching decoder format in the `image` crate.
    pub fn decoder_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Webp => image::ImageFormat::WebP,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// An embedded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Raw encoded bytes
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,

    /// Format declared by the source
    pub format: ImageFormat,

    /// Width in pixels, when the header could be read
    pub width: Option<u32>,

    /// Height in pixels, when the header could be read
    pub height: Option<u32>,
}

impl Resource {
    /// Create an image resource.
    pub fn image(data: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            data,
            format,
            width: None,
            height: None,
        }
    }

    /// Set image dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Natural size in pixels, if known and non-degenerate.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// Format judged from the magic bytes, which may disagree with the
    /// declared one.
    pub fn sniffed_format(&self) -> Option<ImageFormat> {
        match image::guess_format(&self.data).ok()? {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::WebP => Some(ImageFormat::Webp),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Whether the bytes are a JPEG stream that can be embedded as-is.
    pub fn is_jpeg(&self) -> bool {
        self.sniffed_format() == Some(ImageFormat::Jpeg)
    }
}
