// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! DOCX export.
//!
//! Builds a minimal OOXML package by hand: a zip container with the
//! content-types manifest, the package/document relationship parts, the
//! document body, and one media part per embedded image. One centered
//! title block, then a heading + paragraph + image block per step.

use super::{step_image, ExportError, Exporter, ExportImage};
use crate::models::guide::Guide;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Display width of embedded images, in pixels (Word keeps the aspect
/// ratio by scaling height from the source dimensions).
const IMAGE_DISPLAY_WIDTH_PX: f64 = 500.0;

/// EMUs per pixel at 96 DPI.
const EMU_PER_PX: f64 = 9525.0;

/// DOCX document exporter.
pub struct DocxExporter;

impl Exporter for DocxExporter {
    fn id(&self) -> &'static str {
        "docx"
    }

    fn display_name(&self) -> &'static str {
        "Word"
    }

    fn extension(&self) -> &'static str {
        "docx"
    }

    fn export(&self, guide: &Guide) -> Result<Vec<u8>, ExportError> {
        let mut body = String::new();
        body.push_str(&title_block(guide));

        // Collect media while assembling the body; relationship ids are
        // allocated in step order.
        let mut media: Vec<(String, ExportImage)> = Vec::new();
        for (index, step) in guide.steps.iter().enumerate() {
            body.push_str(&heading_paragraph(&format!(
                "{}. {}",
                index + 1,
                step.title
            )));
            body.push_str(&text_paragraph(&step.description));

            if let Some(img) = step_image(step) {
                let img = embeddable(img)?;
                let rel_id = format!("rId{}", media.len() + 1);
                body.push_str(&image_paragraph(&rel_id, &img, media.len() + 1));
                media.push((rel_id, img));
            }
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(content_types().as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(PACKAGE_RELS.as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(document_rels(&media).as_bytes())?;

        for (index, (_, img)) in media.iter().enumerate() {
            zip.start_file(
                format!("word/media/image{}.{}", index + 1, media_extension(img.mime)),
                options,
            )?;
            zip.write_all(&img.bytes)?;
        }

        zip.start_file("word/document.xml", options)?;
        zip.write_all(document_xml(&body).as_bytes())?;

        Ok(zip.finish()?.into_inner())
    }
}

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn content_types() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#,
        r#"<Default Extension="gif" ContentType="image/gif"/>"#,
        r#"<Default Extension="bmp" ContentType="image/bmp"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"</Types>"#,
    )
    .to_string()
}

fn document_rels(media: &[(String, ExportImage)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (index, (rel_id, img)) in media.iter().enumerate() {
        xml.push_str(&format!(
            r#"<Relationship Id="{rel_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{}.{}"/>"#,
            index + 1,
            media_extension(img.mime),
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{body}<w:sectPr/></w:body></w:document>"#,
    )
}

/// Centered title heading plus the author/date line.
fn title_block(guide: &Guide) -> String {
    let date = chrono::Local::now().format("%Y-%m-%d");
    format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:spacing w:after="200"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/><w:sz w:val="48"/></w:rPr><w:t xml:space="preserve">{title}</w:t></w:r></w:p>"#,
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:spacing w:after="400"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:i/><w:color w:val="666666"/></w:rPr><w:t xml:space="preserve">By {author} | {date}</w:t></w:r></w:p>"#,
        ),
        title = escape_xml(&guide.title),
        author = escape_xml(&guide.author),
        date = date,
    )
}

fn heading_paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:spacing w:before="400" w:after="100"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

fn text_paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:spacing w:after="200"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

/// Inline image paragraph, centered, scaled to the display width.
fn image_paragraph(rel_id: &str, img: &ExportImage, number: usize) -> String {
    let width_px = IMAGE_DISPLAY_WIDTH_PX.min(img.width as f64);
    let height_px = width_px * img.height as f64 / img.width.max(1) as f64;
    let cx = (width_px * EMU_PER_PX) as u64;
    let cy = (height_px * EMU_PER_PX) as u64;

    format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:spacing w:after="200"/></w:pPr><w:r><w:drawing>"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{n}" name="Step image {n}"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic>"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{n}" name="Step image {n}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        ),
        cx = cx,
        cy = cy,
        n = number,
        rel_id = rel_id,
    )
}

/// Word only renders a handful of raster formats; anything else (e.g.
/// WebP uploads) is re-encoded to JPEG before embedding.
fn embeddable(img: ExportImage) -> Result<ExportImage, ExportError> {
    match img.mime {
        "image/png" | "image/jpeg" | "image/gif" | "image/bmp" => Ok(img),
        _ => {
            let rgb = image::load_from_memory(&img.bytes)?.to_rgb8();
            let mut bytes = Vec::new();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 80)
                .encode_image(&rgb)?;
            Ok(ExportImage {
                bytes,
                mime: "image/jpeg",
                width: img.width,
                height: img.height,
            })
        }
    }
}

fn media_extension(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "jpeg",
    }
}

/// Escape text for XML element content.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Shape;
    use crate::models::step::test_image;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn empty_guide_produces_valid_package() {
        let guide = Guide::new("Empty Guide", "Author");
        let bytes = DocxExporter.export(&guide).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let document = read_entry(&mut archive, "word/document.xml");
        assert!(document.contains("Empty Guide"));
        assert!(document.contains("By Author"));
        assert!(!document.contains("<w:drawing>"));
        read_entry(&mut archive, "[Content_Types].xml");
        read_entry(&mut archive, "_rels/.rels");
    }

    #[test]
    fn step_images_become_media_parts_with_relationships() {
        let mut guide = Guide::new("Guide", "Author");
        guide.add_step();
        guide.add_step();
        let step = &mut guide.steps[0];
        step.set_image(test_image(40, 20));
        step.add_annotation(Shape::Click { x: 50.0, y: 50.0 });
        guide.steps[1].set_image(test_image(30, 30));

        let bytes = DocxExporter.export(&guide).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        // Annotated step flattens to jpeg, unannotated passes through as png.
        assert!(archive.by_name("word/media/image1.jpeg").is_ok());
        assert!(archive.by_name("word/media/image2.png").is_ok());

        let rels = read_entry(&mut archive, "word/_rels/document.xml.rels");
        assert!(rels.contains(r#"Id="rId1""#));
        assert!(rels.contains(r#"Target="media/image2.png""#));

        let document = read_entry(&mut archive, "word/document.xml");
        assert!(document.contains(r#"r:embed="rId1""#));
        assert!(document.contains(r#"r:embed="rId2""#));
        assert!(document.contains("1. Step 1"));
    }

    #[test]
    fn title_block_carries_todays_date() {
        let guide = Guide::new("Guide", "Author");
        let bytes = DocxExporter.export(&guide).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let document = read_entry(&mut archive, "word/document.xml");

        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        assert!(document.contains(&format!("By Author | {today}")));
    }

    #[test]
    fn image_extent_preserves_aspect_ratio() {
        let img = ExportImage {
            bytes: Vec::new(),
            mime: "image/png",
            width: 1000,
            height: 500,
        };
        let xml = image_paragraph("rId1", &img, 1);
        let cx = (500.0 * EMU_PER_PX) as u64;
        let cy = (250.0 * EMU_PER_PX) as u64;
        assert!(xml.contains(&format!(r#"<wp:extent cx="{cx}" cy="{cy}"/>"#)));
    }

    #[test]
    fn user_text_is_xml_escaped() {
        let mut guide = Guide::new("A & B <Guide>", "Author");
        guide.add_step();
        let bytes = DocxExporter.export(&guide).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let document = read_entry(&mut archive, "word/document.xml");
        assert!(document.contains("A &amp; B &lt;Guide&gt;"));
    }
}
