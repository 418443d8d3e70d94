// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PDF export.
//!
//! Lays the guide out on A4 portrait pages: a title block on the first
//! page, then one flowing block per step with a numbered heading, a
//! word-wrapped description, and the annotated screenshot. Page footers
//! are stamped after layout, once the page count is known.

use super::pdf_writer::{Font, PageBuilder, PdfDocument, MM_TO_PT, PAGE_WIDTH_MM};
use super::{step_image, ExportError, Exporter, ExportImage};
use crate::models::guide::Guide;
use image::codecs::jpeg::JpegEncoder;

const MARGIN_MM: f32 = 20.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

/// A step block never starts below this line.
const STEP_BREAK_MM: f32 = 240.0;
/// Text and images never extend past this line.
const BODY_LIMIT_MM: f32 = 280.0;
const FOOTER_MM: f32 = 285.0;

/// Images take this fraction of the content width.
const IMAGE_WIDTH_RATIO: f32 = 0.7;

const LINE_HEIGHT_MM: f32 = 5.5;

const DARK: (u8, u8, u8) = (30, 41, 59);
const GRAY: (u8, u8, u8) = (100, 116, 139);
const BODY_GRAY: (u8, u8, u8) = (71, 85, 105);
const INDIGO: (u8, u8, u8) = (79, 70, 229);
const RULE: (u8, u8, u8) = (226, 232, 240);

/// PDF document exporter.
pub struct PdfExporter;

impl Exporter for PdfExporter {
    fn id(&self) -> &'static str {
        "pdf"
    }

    fn display_name(&self) -> &'static str {
        "PDF"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn export(&self, guide: &Guide) -> Result<Vec<u8>, ExportError> {
        let mut doc = PdfDocument::new();
        let mut page = PageBuilder::new();
        let mut y = 25.0;

        page.text(MARGIN_MM, y, Font::HelveticaBold, 24.0, DARK, &guide.title);
        y += 8.0;
        page.text(
            MARGIN_MM,
            y,
            Font::Helvetica,
            10.0,
            GRAY,
            &format!("By {}", guide.author),
        );
        y += 5.0;
        page.line(MARGIN_MM, y, PAGE_WIDTH_MM - MARGIN_MM, y, 0.75, RULE);
        y += 12.0;

        for (index, step) in guide.steps.iter().enumerate() {
            if y > STEP_BREAK_MM {
                doc.add_page(page);
                page = PageBuilder::new();
                y = MARGIN_MM;
            }

            let number = format!("{}.", index + 1);
            page.text(MARGIN_MM, y, Font::HelveticaBold, 14.0, INDIGO, &number);
            let number_width = text_width_mm(&number, Font::HelveticaBold, 14.0) + 2.0;
            page.text(
                MARGIN_MM + number_width,
                y,
                Font::HelveticaBold,
                14.0,
                DARK,
                &step.title,
            );
            y += 7.0;

            for line in wrap(&step.description, Font::Helvetica, 11.0, CONTENT_WIDTH_MM) {
                if y > BODY_LIMIT_MM {
                    doc.add_page(page);
                    page = PageBuilder::new();
                    y = MARGIN_MM;
                }
                page.text(MARGIN_MM, y, Font::Helvetica, 11.0, BODY_GRAY, &line);
                y += LINE_HEIGHT_MM;
            }
            y += 4.0;

            match step_image(step) {
                Some(img) => {
                    let w = CONTENT_WIDTH_MM * IMAGE_WIDTH_RATIO;
                    let h = w * img.height as f32 / img.width.max(1) as f32;
                    if y + h > BODY_LIMIT_MM {
                        doc.add_page(page);
                        page = PageBuilder::new();
                        y = MARGIN_MM;
                    }
                    let x = MARGIN_MM + (CONTENT_WIDTH_MM - w) / 2.0;
                    let jpeg = as_jpeg(&img)?;
                    let handle = doc.add_jpeg(jpeg, img.width, img.height);
                    page.image(handle, x, y, w, h);
                    page.rect(x, y, w, h, 0.5, RULE);
                    y += h + 15.0;
                }
                None => y += 10.0,
            }
        }
        doc.add_page(page);

        stamp_footers(&mut doc);
        Ok(doc.render())
    }
}

/// Footer on every page: app name on the left, page counter on the right.
fn stamp_footers(doc: &mut PdfDocument) {
    let total = doc.page_count();
    for (i, page) in doc.pages_mut().iter_mut().enumerate() {
        let label = format!("Page {} of {}", i + 1, total);
        let x = PAGE_WIDTH_MM - MARGIN_MM - text_width_mm(&label, Font::Helvetica, 9.0);
        page.text(MARGIN_MM, FOOTER_MM, Font::Helvetica, 9.0, GRAY, "stepscribe");
        page.text(x, FOOTER_MM, Font::Helvetica, 9.0, GRAY, &label);
    }
}

/// JPEG data for embedding: pass through if already JPEG, otherwise
/// decode and re-encode.
fn as_jpeg(img: &ExportImage) -> Result<Vec<u8>, ExportError> {
    if img.mime == "image/jpeg" {
        return Ok(img.bytes.clone());
    }
    let rgb = image::load_from_memory(&img.bytes)?.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 80).encode_image(&rgb)?;
    Ok(out)
}

fn text_width_mm(text: &str, font: Font, size_pt: f32) -> f32 {
    text.chars().count() as f32 * font.approx_char_width() * size_pt / MM_TO_PT
}

/// Greedy word wrap against the approximate font metrics. Words longer
/// than a whole line get a line of their own rather than being split.
fn wrap(text: &str, font: Font, size_pt: f32, width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, font, size_pt) > width_mm && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Shape;
    use crate::models::step::test_image;

    #[test]
    fn empty_guide_is_a_single_framed_page() {
        let guide = Guide::new("Empty Guide", "Author");
        let bytes = PdfExporter.export(&guide).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Empty Guide) Tj"));
        assert!(text.contains("(Page 1 of 1) Tj"));
    }

    #[test]
    fn annotated_step_embeds_a_jpeg_xobject() {
        let mut guide = Guide::new("Guide", "Author");
        guide.add_step();
        let step = &mut guide.steps[0];
        step.description = "Click the button.".to_string();
        step.set_image(test_image(400, 300));
        step.add_annotation(Shape::Click { x: 50.0, y: 50.0 });

        let bytes = PdfExporter.export(&guide).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Width 400 /Height 300"));
        assert!(text.contains("(1.) Tj"));
        assert!(text.contains("(Step 1) Tj"));
    }

    #[test]
    fn png_pass_through_is_reencoded_for_embedding() {
        let img = ExportImage {
            bytes: test_image(16, 16).bytes,
            mime: "image/png",
            width: 16,
            height: 16,
        };
        let jpeg = as_jpeg(&img).unwrap();
        assert_eq!(
            image::guess_format(&jpeg).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn many_steps_flow_onto_multiple_pages() {
        let mut guide = Guide::new("Long Guide", "Author");
        for _ in 0..12 {
            guide.add_step();
            let step = guide.steps.last_mut().unwrap();
            step.description = "word ".repeat(60).trim_end().to_string();
        }
        let bytes = PdfExporter.export(&guide).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Page 1 of 2) Tj") || text.contains("(Page 1 of 3) Tj"));
        assert!(text.contains("(12.) Tj"));
    }

    #[test]
    fn wrapping_respects_the_line_width() {
        let lines = wrap(&"word ".repeat(40), Font::Helvetica, 11.0, CONTENT_WIDTH_MM);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, Font::Helvetica, 11.0) <= CONTENT_WIDTH_MM);
        }
        assert!(wrap("", Font::Helvetica, 11.0, CONTENT_WIDTH_MM).is_empty());
    }
}
