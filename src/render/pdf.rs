//! PDF serialization of laid-out documents.
//!
//! Writes a PDF 1.4 file using the base-14 Type1 fonts with WinAnsi
//! encoding, so no font data is embedded. Every stream is hex-armoured on
//! top of its real filter and the whole file stays 7-bit ASCII.

use crate::backend::metrics;
use crate::error::Result;
use crate::model::{Document, DrawOp, FontState, Page, Resource};
use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write as _;
use unicode_normalization::UnicodeNormalization;

/// PostScript points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Control-point distance for a quarter-circle Bezier.
const KAPPA: f32 = 0.552_284_8;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;

const BASE_FONTS: [&str; 8] = [
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
];

/// Serialize `doc` as PDF bytes.
pub fn to_pdf(doc: &Document) -> Result<Vec<u8>> {
    PdfWriter::new(doc).write()
}

/// An image ready to be written as an XObject.
struct ImageXObject {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

/// Assembles PDF objects for one document.
pub struct PdfWriter<'a> {
    doc: &'a Document,
    objects: Vec<String>,
}

impl<'a> PdfWriter<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            objects: Vec::new(),
        }
    }

    fn alloc(&mut self) -> usize {
        self.objects.push(String::new());
        self.objects.len()
    }

    fn set(&mut self, id: usize, body: String) {
        self.objects[id - 1] = body;
    }

    /// Produce the complete file.
    pub fn write(mut self) -> Result<Vec<u8>> {
        let catalog = self.alloc();
        let pages = self.alloc();
        debug_assert_eq!((catalog, pages), (CATALOG_ID, PAGES_ID));

        let mut font_refs = String::new();
        for (index, name) in BASE_FONTS.iter().enumerate() {
            let id = self.alloc();
            self.set(
                id,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    name
                ),
            );
            let _ = write!(font_refs, " /F{} {} 0 R", index + 1, id);
        }

        let mut xobject_names: BTreeMap<&str, String> = BTreeMap::new();
        let mut xobject_refs = String::new();
        for (index, (resource_id, resource)) in self.doc.resources.iter().enumerate() {
            let Some(image) = image_xobject(resource)? else {
                log::warn!("Image {} could not be decoded; drawing a frame", resource_id);
                continue;
            };
            let smask = image.alpha.as_ref().map(|alpha| {
                let id = self.alloc();
                (id, smask_object(&image, alpha))
            });
            if let Some((id, body)) = smask.as_ref() {
                self.set(*id, body.clone());
            }
            let id = self.alloc();
            self.set(id, image_object(&image, smask.map(|(id, _)| id)));

            let name = format!("Im{}", index + 1);
            let _ = write!(xobject_refs, " /{} {} 0 R", name, id);
            xobject_names.insert(resource_id.as_str(), name);
        }

        let mut resources = format!("<< /Font <<{} >>", font_refs);
        if !xobject_refs.is_empty() {
            let _ = write!(resources, " /XObject <<{} >>", xobject_refs);
        }
        resources.push_str(" >>");

        let mut kids = Vec::with_capacity(self.doc.pages.len());
        for page in &self.doc.pages {
            let content = content_stream(page, &xobject_names);
            let content_id = self.alloc();
            let stream = stream_object(&content)?;
            self.set(content_id, stream);

            let page_id = self.alloc();
            self.set(
                page_id,
                format!(
                    "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} /Contents {} 0 R >>",
                    PAGES_ID,
                    num(page.width * PT_PER_MM),
                    num(page.height * PT_PER_MM),
                    resources,
                    content_id
                ),
            );
            kids.push(format!("{} 0 R", page_id));
        }

        self.set(
            PAGES_ID,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                kids.len()
            ),
        );
        self.set(
            CATALOG_ID,
            format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID),
        );

        let info = self.alloc();
        let info_body = self.info_object();
        self.set(info, info_body);

        Ok(self.serialize(info))
    }

    fn info_object(&self) -> String {
        let meta = &self.doc.metadata;
        let mut info = String::from("<<");
        if !meta.title.is_empty() {
            let _ = write!(info, " /Title {}", hex_string(&meta.title));
        }
        if !meta.template.is_empty() {
            let _ = write!(info, " /Subject {}", hex_string(&meta.template));
        }
        if !meta.producer.is_empty() {
            let _ = write!(info, " /Producer {}", hex_string(&meta.producer));
        }
        if let Some(created) = meta.created {
            let _ = write!(info, " /CreationDate ({})", pdf_date(&created));
        }
        info.push_str(" >>");
        info
    }

    fn serialize(self, info_id: usize) -> Vec<u8> {
        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(self.objects.len());
        for (index, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", index + 1, body);
        }

        let xref_start = out.len();
        let _ = write!(out, "xref\n0 {}\n", self.objects.len() + 1);
        out.push_str("0000000000 65535 f \n");
        for offset in offsets {
            let _ = writeln!(out, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.objects.len() + 1,
            CATALOG_ID,
            info_id,
            xref_start
        );
        out.into_bytes()
    }
}

/// Drawing operators for one page. Converts top-left millimetres to
/// bottom-left points.
fn content_stream(page: &Page, xobjects: &BTreeMap<&str, String>) -> String {
    let x = |mm: f32| num(mm * PT_PER_MM);
    let y = |mm: f32| num((page.height - mm) * PT_PER_MM);
    let mut out = String::new();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                text,
                x: tx,
                y: ty,
                font,
                underline,
            } => {
                let _ = writeln!(
                    out,
                    "BT /F{} {} Tf {} {} Td {} Tj ET",
                    font_index(font) + 1,
                    num(font.size_pt),
                    x(*tx),
                    y(*ty),
                    hex_string(text)
                );
                if *underline {
                    let width = metrics::text_width(text, font);
                    let below = *ty + font.size_pt * 0.1 * metrics::MM_PER_PT;
                    let _ = writeln!(
                        out,
                        "{} w {} {} m {} {} l S",
                        num(font.size_pt * 0.05),
                        x(*tx),
                        y(below),
                        x(*tx + width),
                        y(below)
                    );
                }
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
            } => {
                let _ = writeln!(
                    out,
                    "{} w {} {} m {} {} l S",
                    num(width * PT_PER_MM),
                    x(*x1),
                    y(*y1),
                    x(*x2),
                    y(*y2)
                );
            }
            DrawOp::Circle {
                cx,
                cy,
                radius,
                filled,
            } => {
                let path = circle_path(cx * PT_PER_MM, (page.height - cy) * PT_PER_MM, radius * PT_PER_MM);
                let paint = if *filled { "f" } else { "S" };
                let _ = writeln!(out, "0.57 w {}{}", path, paint);
            }
            DrawOp::Image {
                resource_id,
                x: ix,
                y: iy,
                width,
                height,
            } => match xobjects.get(resource_id.as_str()) {
                Some(name) => {
                    let _ = writeln!(
                        out,
                        "q {} 0 0 {} {} {} cm /{} Do Q",
                        num(width * PT_PER_MM),
                        num(height * PT_PER_MM),
                        x(*ix),
                        y(iy + height),
                        name
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "0.57 w {} {} {} {} re S",
                        x(*ix),
                        y(iy + height),
                        num(width * PT_PER_MM),
                        num(height * PT_PER_MM)
                    );
                }
            },
        }
    }
    out
}

/// Closed four-segment Bezier approximation of a circle, without the paint operator.
fn circle_path(cx: f32, cy: f32, r: f32) -> String {
    let k = r * KAPPA;
    let mut path = format!("{} {} m ", num(cx + r), num(cy));
    let segments = [
        (cx + r, cy + k, cx + k, cy + r, cx, cy + r),
        (cx - k, cy + r, cx - r, cy + k, cx - r, cy),
        (cx - r, cy - k, cx - k, cy - r, cx, cy - r),
        (cx + k, cy - r, cx + r, cy - k, cx + r, cy),
    ];
    for (x1, y1, x2, y2, x3, y3) in segments {
        let _ = write!(
            path,
            "{} {} {} {} {} {} c ",
            num(x1),
            num(y1),
            num(x2),
            num(y2),
            num(x3),
            num(y3)
        );
    }
    path.push_str("h ");
    path
}

fn font_index(font: &FontState) -> usize {
    let name = font.base_font_name();
    BASE_FONTS.iter().position(|f| *f == name).unwrap_or(0)
}

/// Decode a resource into an XObject; JPEG data passes through untouched.
fn image_xobject(resource: &Resource) -> Result<Option<ImageXObject>> {
    let decoded = match image::load_from_memory_with_format(
        &resource.data,
        resource.format.decoder_format(),
    )
    .or_else(|_| image::load_from_memory(&resource.data))
    {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Image decode failed: {}", e);
            return Ok(None);
        }
    };
    let (width, height) = (decoded.width(), decoded.height());

    if resource.is_jpeg() {
        let color_space = match decoded.color() {
            image::ColorType::L8 | image::ColorType::La8 => "/DeviceGray",
            _ => "/DeviceRGB",
        };
        return Ok(Some(ImageXObject {
            width,
            height,
            color_space,
            filter: "/DCTDecode",
            data: resource.data.clone(),
            alpha: None,
        }));
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        has_alpha |= a != 255;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let alpha = if has_alpha {
        Some(flate_compress(&alpha)?)
    } else {
        None
    };
    Ok(Some(ImageXObject {
        width,
        height,
        color_space: "/DeviceRGB",
        filter: "/FlateDecode",
        data: flate_compress(&rgb)?,
        alpha,
    }))
}

fn image_object(image: &ImageXObject, smask_id: Option<usize>) -> String {
    let data = encode_stream_data(&image.data);
    let smask = smask_id
        .map(|id| format!(" /SMask {} 0 R", id))
        .unwrap_or_default();
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Length {} /Filter [/ASCIIHexDecode {}]{} >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        image.color_space,
        data.len(),
        image.filter,
        smask,
        data
    )
}

fn smask_object(image: &ImageXObject, alpha: &[u8]) -> String {
    let data = encode_stream_data(alpha);
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray /BitsPerComponent 8 /Length {} /Filter [/ASCIIHexDecode /FlateDecode] >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        data.len(),
        data
    )
}

fn stream_object(content: &str) -> Result<String> {
    let data = encode_stream_data(&flate_compress(content.as_bytes())?);
    Ok(format!(
        "<< /Length {} /Filter [/ASCIIHexDecode /FlateDecode] >>\nstream\n{}\nendstream",
        data.len(),
        data
    ))
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn encode_stream_data(data: &[u8]) -> String {
    let mut hex = ascii_hex_encode(data);
    hex.push('>');
    hex
}

fn ascii_hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2 + data.len() / 32);
    for (index, byte) in data.iter().enumerate() {
        let _ = write!(out, "{:02X}", byte);
        if index % 32 == 31 {
            out.push('\n');
        }
    }
    out
}

/// `<...>` string of the WinAnsi bytes of `text`.
fn hex_string(text: &str) -> String {
    let mut out = String::from("<");
    for byte in to_winansi_bytes(text) {
        let _ = write!(out, "{:02X}", byte);
    }
    out.push('>');
    out
}

/// Map text to Windows-1252 after NFC composition. Characters with no
/// WinAnsi code become `?`.
pub fn to_winansi_bytes(text: &str) -> Vec<u8> {
    text.nfc()
        .map(|c| match c as u32 {
            0x0020..=0x007E => c as u8,
            0x00A0..=0x00FF => c as u8,
            0x20AC => 0x80,
            0x201A => 0x82,
            0x0192 => 0x83,
            0x201E => 0x84,
            0x2026 => 0x85,
            0x2020 => 0x86,
            0x2021 => 0x87,
            0x02C6 => 0x88,
            0x2030 => 0x89,
            0x0160 => 0x8A,
            0x2039 => 0x8B,
            0x0152 => 0x8C,
            0x017D => 0x8E,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2022 => 0x95,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x02DC => 0x98,
            0x2122 => 0x99,
            0x0161 => 0x9A,
            0x203A => 0x9B,
            0x0153 => 0x9C,
            0x017E => 0x9E,
            0x0178 => 0x9F,
            0x0009 | 0x000A | 0x000D => b' ',
            _ => b'?',
        })
        .collect()
}

fn pdf_date(date: &DateTime<Utc>) -> String {
    format!("D:{}+00'00'", date.format("%Y%m%d%H%M%S"))
}

/// Compact decimal: two places, trailing zeros dropped.
fn num(value: f32) -> String {
    let mut s = format!("{:.2}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageFormat, Metadata};

    fn one_page_doc() -> Document {
        let mut doc = Document::new();
        doc.metadata = Metadata {
            title: "Math".to_string(),
            ..Default::default()
        };
        let mut page = Page::new(1, 210.0, 297.0);
        page.push(DrawOp::Text {
            text: "Café".to_string(),
            x: 20.0,
            y: 20.0,
            font: FontState::helvetica(11.0).bold(),
            underline: true,
        });
        page.push(DrawOp::Circle {
            cx: 35.0,
            cy: 98.0,
            radius: 2.0,
            filled: true,
        });
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_stream_data_inflates_to_content() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let content = "BT /F1 11 Tf 56.69 785.2 Td <41> Tj ET";
        let compressed = flate_compress(content.as_bytes()).unwrap();
        let mut inflated = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut inflated)
            .unwrap();
        assert_eq!(inflated, content);

        let object = stream_object(content).unwrap();
        assert!(object.starts_with("<< /Length "));
        assert!(object.contains("/Filter [/ASCIIHexDecode /FlateDecode]"));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(1.234), "1.23");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(to_winansi_bytes("A\u{2014}B"), vec![b'A', 0x97, b'B']);
        // decomposed e + combining acute composes to 0xE9
        assert_eq!(to_winansi_bytes("e\u{0301}"), vec![0xE9]);
        assert_eq!(to_winansi_bytes("\u{4E2D}"), vec![b'?']);
    }

    #[test]
    fn test_file_structure() {
        let bytes = to_pdf(&one_page_doc()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/Title <4D617468>"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = to_pdf(&one_page_doc()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let xref = text.rfind("xref\n").unwrap();
        let first_entry = text[xref..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(text[offset..].starts_with("1 0 obj"));
    }

    #[test]
    fn test_content_stream_coordinates() {
        let doc = one_page_doc();
        let content = content_stream(&doc.pages[0], &BTreeMap::new());
        // x = 20 mm, y = (297 - 20) mm in points
        assert!(content.starts_with("BT /F2 11 Tf 56.69 785.2 Td <436166E9> Tj ET\n"));
        assert!(content.contains(" l S\n"));
        assert!(content.trim_end().ends_with("h f"));
    }

    #[test]
    fn test_undecodable_image_framed() {
        let mut doc = one_page_doc();
        doc.add_resource(
            "img1".to_string(),
            Resource::image(vec![0, 1, 2, 3], ImageFormat::Png),
        );
        doc.pages[0].push(DrawOp::Image {
            resource_id: "img1".to_string(),
            x: 30.0,
            y: 40.0,
            width: 50.0,
            height: 20.0,
        });
        let bytes = to_pdf(&doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("/Subtype /Image"));
    }

    #[test]
    fn test_png_becomes_flate_xobject() {
        let mut img = image::RgbaImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 128]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let resource = Resource::image(png, ImageFormat::Png).with_dimensions(4, 2);
        let xobject = image_xobject(&resource).unwrap().unwrap();
        assert_eq!((xobject.width, xobject.height), (4, 2));
        assert_eq!(xobject.filter, "/FlateDecode");
        assert!(xobject.alpha.is_some());
    }
}
