// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Self-contained HTML export.
//!
//! Produces a single document with all images inlined as base64 data
//! URIs, so the file can be shared or hosted as-is.

use super::{step_image, ExportError, Exporter};
use crate::models::guide::Guide;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

const STYLE: &str = r#"
      body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; background: #f8fafc; }
      .container { background: white; padding: 40px; border-radius: 12px; box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1); border: 1px solid #e2e8f0; }
      header { border-bottom: 2px solid #e2e8f0; padding-bottom: 20px; margin-bottom: 30px; }
      h1 { margin: 0; color: #1e293b; font-size: 2em; }
      .meta { color: #64748b; font-size: 0.9em; margin-top: 8px; }
      .step { margin-bottom: 50px; }
      .step-header { display: flex; align-items: flex-start; gap: 15px; margin-bottom: 15px; }
      .step-number { background: #4f46e5; color: white; font-weight: bold; width: 32px; height: 32px; display: flex; align-items: center; justify-content: center; border-radius: 50%; flex-shrink: 0; font-size: 14px; }
      .step-content { flex: 1; }
      .step-title { font-size: 1.25em; font-weight: bold; color: #1e293b; margin: 0 0 8px 0; }
      .step-desc { color: #475569; margin-bottom: 20px; font-size: 1rem; }
      .step-image { border: 1px solid #e2e8f0; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
      img { display: block; width: 100%; height: auto; }
"#;

/// HTML document exporter.
pub struct HtmlExporter;

impl Exporter for HtmlExporter {
    fn id(&self) -> &'static str {
        "html"
    }

    fn display_name(&self) -> &'static str {
        "HTML"
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    fn export(&self, guide: &Guide) -> Result<Vec<u8>, ExportError> {
        let mut body = String::new();
        body.push_str(&format!(
            "      <header>\n        <h1>{}</h1>\n        <div class=\"meta\">By {}</div>\n      </header>\n",
            escape_html(&guide.title),
            escape_html(&guide.author),
        ));

        for (index, step) in guide.steps.iter().enumerate() {
            let image_block = match step_image(step) {
                Some(img) => format!(
                    "\n              <div class=\"step-image\">\n                <img src=\"data:{};base64,{}\" alt=\"Step {}\" />\n              </div>",
                    img.mime,
                    BASE64.encode(&img.bytes),
                    index + 1,
                ),
                None => String::new(),
            };
            body.push_str(&format!(
                r#"      <div class="step">
        <div class="step-header">
          <div class="step-number">{number}</div>
          <div class="step-content">
            <h3 class="step-title">{title}</h3>
            <div class="step-desc">{desc}</div>{image_block}
          </div>
        </div>
      </div>
"#,
                number = index + 1,
                title = escape_html(&step.title),
                desc = escape_html(&step.description),
            ));
        }

        let document = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>{STYLE}  </style>
</head>
<body>
  <div class="container">
{body}  </div>
</body>
</html>
"#,
            title = escape_html(&guide.title),
        );
        Ok(document.into_bytes())
    }
}

/// Escape text for inclusion in HTML element content or attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Shape;
    use crate::models::step::{test_image, Step};

    #[test]
    fn empty_guide_produces_header_only_document() {
        let guide = Guide::new("Empty Guide", "Author");
        let bytes = HtmlExporter.export(&guide).unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Empty Guide</h1>"));
        assert!(html.contains("By Author"));
        assert!(!html.contains("step-number"));
    }

    #[test]
    fn steps_are_numbered_and_images_inlined() {
        let mut guide = Guide::new("Guide", "Author");
        guide.add_step();
        guide.add_step();
        let step = &mut guide.steps[0];
        step.set_image(test_image(32, 32));
        step.add_annotation(Shape::Click { x: 50.0, y: 50.0 });

        let html = String::from_utf8(HtmlExporter.export(&guide).unwrap()).unwrap();
        assert!(html.contains(r#"<div class="step-number">1</div>"#));
        assert!(html.contains(r#"<div class="step-number">2</div>"#));
        assert!(html.contains("data:image/jpeg;base64,"));
    }

    #[test]
    fn markup_in_user_text_is_escaped() {
        let mut guide = Guide::new("<b>Title</b>", "A & B");
        guide.add_step();
        guide.steps[0].title = "<script>alert(1)</script>".to_string();

        let html = String::from_utf8(HtmlExporter.export(&guide).unwrap()).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &amp; B"));
    }
}
