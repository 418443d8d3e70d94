// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Minimal PDF 1.4 writer.
//!
//! Assembles the object graph, content streams, cross-reference table
//! and trailer by hand; only the features the guide exporter needs are
//! supported: Helvetica text, stroked lines and rectangles, and JPEG
//! images embedded as DCTDecode XObjects.
//!
//! Page geometry is expressed in millimetres from the top-left corner
//! of an A4 portrait page and converted to PDF points (bottom-left
//! origin) when operators are emitted.

use std::fmt::Write as _;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// The two base-14 fonts the exporter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// Rough advance width of a character in units of the font size.
    /// Helvetica averages a bit over half an em for mixed text; good
    /// enough for greedy line wrapping.
    pub fn approx_char_width(self) -> f32 {
        match self {
            Font::Helvetica => 0.5,
            Font::HelveticaBold => 0.53,
        }
    }
}

/// A JPEG image registered with the document.
struct JpegImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

/// Content stream under construction for one page.
#[derive(Default)]
pub struct PageBuilder {
    ops: String,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a line of text with its baseline at `y_mm`.
    pub fn text(
        &mut self,
        x_mm: f32,
        y_mm: f32,
        font: Font,
        size_pt: f32,
        color: (u8, u8, u8),
        text: &str,
    ) {
        let _ = write!(
            self.ops,
            "BT /{} {} Tf {} rg 1 0 0 1 {:.2} {:.2} Tm ({}) Tj ET\n",
            font.resource_name(),
            fmt_num(size_pt),
            fmt_color(color),
            x_mm * MM_TO_PT,
            (PAGE_HEIGHT_MM - y_mm) * MM_TO_PT,
            escape_text(text),
        );
    }

    /// Stroke a straight line between two points.
    pub fn line(
        &mut self,
        x1_mm: f32,
        y1_mm: f32,
        x2_mm: f32,
        y2_mm: f32,
        width_pt: f32,
        color: (u8, u8, u8),
    ) {
        let _ = write!(
            self.ops,
            "{} RG {} w {:.2} {:.2} m {:.2} {:.2} l S\n",
            fmt_color(color),
            fmt_num(width_pt),
            x1_mm * MM_TO_PT,
            (PAGE_HEIGHT_MM - y1_mm) * MM_TO_PT,
            x2_mm * MM_TO_PT,
            (PAGE_HEIGHT_MM - y2_mm) * MM_TO_PT,
        );
    }

    /// Stroke a rectangle outline. `x_mm`/`y_mm` name the top-left corner.
    pub fn rect(
        &mut self,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        width_pt: f32,
        color: (u8, u8, u8),
    ) {
        let _ = write!(
            self.ops,
            "{} RG {} w {:.2} {:.2} {:.2} {:.2} re S\n",
            fmt_color(color),
            fmt_num(width_pt),
            x_mm * MM_TO_PT,
            (PAGE_HEIGHT_MM - y_mm - h_mm) * MM_TO_PT,
            w_mm * MM_TO_PT,
            h_mm * MM_TO_PT,
        );
    }

    /// Place a registered image with its top-left corner at `x_mm`/`y_mm`.
    pub fn image(&mut self, index: usize, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32) {
        let _ = write!(
            self.ops,
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q\n",
            w_mm * MM_TO_PT,
            h_mm * MM_TO_PT,
            x_mm * MM_TO_PT,
            (PAGE_HEIGHT_MM - y_mm - h_mm) * MM_TO_PT,
            index + 1,
        );
    }
}

/// A PDF document under construction: pages plus shared image resources.
#[derive(Default)]
pub struct PdfDocument {
    pages: Vec<PageBuilder>,
    images: Vec<JpegImage>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register JPEG data for later placement; returns the image index.
    pub fn add_jpeg(&mut self, bytes: Vec<u8>, width: u32, height: u32) -> usize {
        self.images.push(JpegImage {
            bytes,
            width,
            height,
        });
        self.images.len() - 1
    }

    pub fn add_page(&mut self, page: PageBuilder) {
        self.pages.push(page);
    }

    pub fn pages_mut(&mut self) -> &mut [PageBuilder] {
        &mut self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the document.
    ///
    /// Object layout: 1 catalog, 2 page tree, 3-4 fonts, then one object
    /// per image, then a page object and a content stream per page.
    pub fn render(self) -> Vec<u8> {
        let image_base = 5;
        let page_base = image_base + self.images.len();
        let page_count = self.pages.len().max(1);
        let total_objects = page_base - 1 + 2 * page_count;

        let mut objects: Vec<Vec<u8>> = Vec::with_capacity(total_objects);

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", page_base + 2 * i))
            .collect();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                page_count
            )
            .into_bytes(),
        );

        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );
        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        let mut xobject_entries = String::new();
        for (i, img) in self.images.iter().enumerate() {
            let _ = write!(xobject_entries, "/Im{} {} 0 R ", i + 1, image_base + i);
            let mut obj = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode \
                 /Length {} >>\nstream\n",
                img.width,
                img.height,
                img.bytes.len()
            )
            .into_bytes();
            obj.extend_from_slice(&img.bytes);
            obj.extend_from_slice(b"\nendstream");
            objects.push(obj);
        }

        let resources = format!(
            "/Resources << /Font << /F1 3 0 R /F2 4 0 R >> /XObject << {}>> >>",
            xobject_entries
        );

        let mut pages = self.pages;
        if pages.is_empty() {
            pages.push(PageBuilder::new());
        }
        for (i, page) in pages.into_iter().enumerate() {
            let content_id = page_base + 2 * i + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] {} /Contents {} 0 R >>",
                    PAGE_WIDTH_MM * MM_TO_PT,
                    PAGE_HEIGHT_MM * MM_TO_PT,
                    resources,
                    content_id,
                )
                .into_bytes(),
            );
            let stream = page.ops.into_bytes();
            let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            obj.extend_from_slice(&stream);
            obj.extend_from_slice(b"\nendstream");
            objects.push(obj);
        }

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset,
            )
            .as_bytes(),
        );
        out
    }
}

/// Escape a string for a PDF literal string. The fonts declare
/// WinAnsiEncoding, which reads one byte per glyph, so characters in
/// 0x80-0xFF are emitted as octal escapes rather than UTF-8 sequences;
/// characters outside Latin-1 are replaced.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_ascii() => out.push(c),
            c if (c as u32) < 256 => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

fn fmt_color((r, g, b): (u8, u8, u8)) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0
    )
}

fn fmt_num(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_has_valid_frame() {
        let bytes = PdfDocument::new().render();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("trailer"));
    }

    #[test]
    fn text_is_positioned_from_top_left_millimetres() {
        let mut page = PageBuilder::new();
        page.text(10.0, 20.0, Font::Helvetica, 12.0, (0, 0, 0), "Hello");
        // 10mm = 28.35pt from the left, 277mm = 785.20pt up from the bottom.
        assert!(page.ops.contains("1 0 0 1 28.35 785.20 Tm (Hello) Tj"));
        assert!(page.ops.contains("/F1 12 Tf"));
    }

    #[test]
    fn literal_strings_are_escaped() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_text("caf\u{e9} \u{2013} ok"), "caf\\351 ? ok");
    }

    #[test]
    fn accented_text_is_winansi_encoded() {
        let mut doc = PdfDocument::new();
        let mut page = PageBuilder::new();
        page.text(10.0, 10.0, Font::Helvetica, 12.0, (0, 0, 0), "caf\u{e9}");
        doc.add_page(page);
        let bytes = doc.render();

        // The content stream stays ASCII; 0xE9 travels as an octal
        // escape, never as the UTF-8 pair 0xC3 0xA9.
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(caf\\351) Tj"));
        assert!(!bytes.windows(2).any(|w| w == [0xc3, 0xa9]));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new();
        let mut page = PageBuilder::new();
        page.text(10.0, 10.0, Font::HelveticaBold, 24.0, (30, 41, 59), "Title");
        doc.add_page(page);
        let bytes = doc.render();

        let text = String::from_utf8_lossy(&bytes);
        let xref_pos = text.rfind("xref\n").unwrap();
        for (i, line) in text[xref_pos..].lines().skip(3).take(6).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let header = format!("{} 0 obj", i + 1);
            assert!(text[offset..].starts_with(&header), "object {}", i + 1);
        }
        let start = text.rfind("startxref\n").unwrap() + "startxref\n".len();
        let declared: usize = text[start..].lines().next().unwrap().parse().unwrap();
        assert_eq!(declared, xref_pos);
    }

    #[test]
    fn images_become_dctdecode_xobjects() {
        let mut doc = PdfDocument::new();
        let index = doc.add_jpeg(vec![0xff, 0xd8, 0xff, 0xd9], 320, 240);
        let mut page = PageBuilder::new();
        page.image(index, 20.0, 30.0, 100.0, 75.0);
        doc.add_page(page);

        let bytes = doc.render();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Width 320 /Height 240"));
        assert!(text.contains("/Im1 Do"));
    }
}
