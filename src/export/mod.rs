// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Guide export: HTML, DOCX, and PDF documents.
//!
//! Each exporter flattens annotated screenshots through the compositor
//! and assembles a complete, self-contained document in memory. The
//! exporters share the filename rule and the per-step image preparation;
//! they do not share any layout code.

mod docx;
mod error;
mod html;
mod pdf;
mod pdf_writer;

pub use docx::DocxExporter;
pub use error::ExportError;
pub use html::HtmlExporter;
pub use pdf::PdfExporter;

use crate::compose;
use crate::models::guide::Guide;
use crate::models::step::Step;

/// A document format the guide can be exported to.
pub trait Exporter: Send + Sync {
    /// Unique identifier for this format (e.g. "html").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// Produce the complete document bytes for the guide.
    fn export(&self, guide: &Guide) -> Result<Vec<u8>, ExportError>;
}

/// All available exporters, in toolbar order.
pub fn all() -> Vec<Box<dyn Exporter>> {
    vec![
        Box::new(HtmlExporter),
        Box::new(DocxExporter),
        Box::new(PdfExporter),
    ]
}

/// Download filename for a guide: whitespace runs in the title become a
/// single underscore, identically for every format.
pub fn download_file_name(title: &str, extension: &str) -> String {
    let stem: Vec<&str> = title.split_whitespace().collect();
    let stem = if stem.is_empty() {
        "guide".to_string()
    } else {
        stem.join("_")
    };
    format!("{stem}.{extension}")
}

/// An image prepared for embedding in an export document.
pub(crate) struct ExportImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Prepare a step's image for export.
///
/// Steps with annotations go through the compositor (fresh flatten per
/// export, never cached); unannotated images pass through unchanged. A
/// flattening failure logs the error and skips the image so the rest of
/// the export proceeds.
pub(crate) fn step_image(step: &Step) -> Option<ExportImage> {
    let image = step.image.as_ref()?;
    if step.annotations.is_empty() {
        return Some(ExportImage {
            bytes: image.bytes.clone(),
            mime: image.mime_type(),
            width: image.width,
            height: image.height,
        });
    }
    match compose::flatten(image, &step.annotations) {
        Ok(bytes) => Some(ExportImage {
            bytes,
            mime: "image/jpeg",
            width: image.width,
            height: image.height,
        }),
        Err(e) => {
            log::error!("skipping image of step {}: {e}", step.id);
            None
        }
    }
}
