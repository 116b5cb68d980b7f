//! Image placement under a bounding box.
//!
//! Only `data:` URIs carry image bytes. A bare path cannot be resolved by the
//! engine and becomes a one-line placeholder, as does any data URI that fails
//! to decode. Nothing here returns an error to the composer.

use super::{LayoutOptions, Point, Rect};
use crate::backend::DocumentBackend;
use crate::error::{Error, Result};
use crate::model::{FontState, ImageFormat, Resource};
use base64::Engine;
use std::io::Cursor;

/// Decode a `data:<mime>;base64,<payload>` URI into an image resource.
///
/// The format comes from the MIME prefix. Pixel dimensions are read from
/// the image header when possible and left unset otherwise.
pub fn decode_data_uri(uri: &str) -> Result<Resource> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| Error::ImageDecode("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::ImageDecode("data URI has no payload".to_string()))?;

    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or_default();
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(Error::ImageDecode(format!(
            "only base64 data URIs are supported ({})",
            header
        )));
    }

    let format = ImageFormat::from_mime(mime);
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let data = base64::engine::general_purpose::STANDARD.decode(compact.as_bytes())?;
    if data.is_empty() {
        return Err(Error::ImageDecode("empty image payload".to_string()));
    }

    let resource = Resource::image(data, format);
    match read_dimensions(&resource) {
        Ok((width, height)) => Ok(resource.with_dimensions(width, height)),
        Err(e) => {
            log::debug!("Image dimensions unavailable: {}", e);
            Ok(resource)
        }
    }
}

fn read_dimensions(resource: &Resource) -> Result<(u32, u32)> {
    let format = match resource.sniffed_format() {
        Some(actual) if actual != resource.format => {
            log::debug!("Image declared as {:?} is {:?}", resource.format, actual);
            actual
        }
        _ => resource.format,
    };
    let reader =
        image::ImageReader::with_format(Cursor::new(resource.data.as_slice()), format.decoder_format());
    Ok(reader.into_dimensions()?)
}

/// Largest size with the natural aspect ratio that fits `max_width` x `max_height`.
pub fn fit_within(natural: (u32, u32), max_width: f32, max_height: f32) -> (f32, f32) {
    let aspect = natural.0 as f32 / natural.1 as f32;
    let mut width = max_width.min(max_height * aspect);
    let mut height = width / aspect;
    if height > max_height {
        height = max_height;
        width = height * aspect;
    }
    (width, height)
}

/// What the placer decided to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedImage {
    /// The image itself in its display box.
    Image { resource: Resource, rect: Rect },
    /// A text line standing in for an image that could not be shown.
    Placeholder { text: String, at: Point },
}

/// Result of placing an image reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Vertical space the cursor must advance
    pub consumed_height: f32,
    /// Draw operation, if any
    pub content: Option<PlacedImage>,
}

impl ImagePlacement {
    fn empty() -> Self {
        Self {
            consumed_height: 0.0,
            content: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, Some(PlacedImage::Placeholder { .. }))
    }
}

/// Sizes images and degrades to placeholders.
#[derive(Debug, Clone)]
pub struct ImagePlacer {
    gap: f32,
    fallback_height: f32,
    placeholder_height: f32,
    placeholder_font: FontState,
}

impl ImagePlacer {
    pub fn new(options: &LayoutOptions) -> Self {
        Self {
            gap: options.image_gap,
            fallback_height: options.image_fallback_height,
            placeholder_height: options.line_height,
            placeholder_font: options.font(options.info_font_pt),
        }
    }

    /// Decide how `image_ref` is shown with its top-left corner at `origin`.
    pub fn place(
        &self,
        image_ref: Option<&str>,
        origin: Point,
        max_width: f32,
        max_height: f32,
    ) -> ImagePlacement {
        let Some(image_ref) = image_ref else {
            return ImagePlacement::empty();
        };

        if !image_ref.trim_start().starts_with("data:") {
            log::warn!("Image reference is not a data URI: {}", image_ref);
            return self.placeholder(format!("[Image: {}]", image_ref), origin);
        }

        let resource = match decode_data_uri(image_ref) {
            Ok(resource) => resource,
            Err(e) => {
                log::warn!("{}", e);
                return self.placeholder("[Image unavailable]".to_string(), origin);
            }
        };

        let (width, height) = match resource.dimensions() {
            Some(natural) => fit_within(natural, max_width, max_height),
            None => (max_width * 0.8, self.fallback_height.min(max_height)),
        };
        log::debug!(
            "Placing {} image at {:.1}x{:.1} mm",
            resource.format.extension(),
            width,
            height
        );

        ImagePlacement {
            consumed_height: height + self.gap,
            content: Some(PlacedImage::Image {
                resource,
                rect: Rect::new(origin.x, origin.y, width, height),
            }),
        }
    }

    fn placeholder(&self, text: String, origin: Point) -> ImagePlacement {
        ImagePlacement {
            consumed_height: self.placeholder_height,
            content: Some(PlacedImage::Placeholder { text, at: origin }),
        }
    }

    /// Emit the placement's draw operation.
    pub fn draw(&self, placement: &ImagePlacement, backend: &mut dyn DocumentBackend) {
        match &placement.content {
            Some(PlacedImage::Image { resource, rect }) => backend.add_image(resource, *rect),
            Some(PlacedImage::Placeholder { text, at }) => {
                backend.draw_text(text, *at, &self.placeholder_font, false)
            }
            None => {}
        }
    }
}
