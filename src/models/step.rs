// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Step data structures.
//!
//! A step is one instructional unit: a title, a description, an optional
//! screenshot, and the annotations drawn over that screenshot.

use super::annotation::{timestamp_id, Annotation, Shape};
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// An uploaded screenshot: the original encoded bytes plus its native
/// pixel dimensions, probed once at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Encoded image bytes (PNG/JPEG as uploaded).
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// Native pixel width.
    pub width: u32,
    /// Native pixel height.
    pub height: u32,
}

impl EncodedImage {
    /// Validate encoded bytes and capture the native dimensions.
    ///
    /// Fails on anything the image decoder does not recognize, which is
    /// how non-image files get rejected at upload time.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .context("failed to probe image format")?
            .into_dimensions()
            .context("file is not a valid image")?;
        Ok(Self {
            bytes,
            width,
            height,
        })
    }

    /// MIME type of the encoded bytes, for data-URI embedding.
    pub fn mime_type(&self) -> &'static str {
        image::guess_format(&self.bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Serialize image bytes as a base64 string so persisted guides stay
/// valid, reasonably compact JSON.
mod base64_bytes {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// One instructional step of a guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier within the guide, never reused in a session.
    pub id: u64,
    pub title: String,
    pub description: String,
    /// The screenshot, if one has been uploaded.
    pub image: Option<EncodedImage>,
    /// Annotations over `image`, in creation order.
    pub annotations: Vec<Annotation>,
}

impl Step {
    /// Create a step with the given id and title and no content.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            image: None,
            annotations: Vec::new(),
        }
    }

    /// Set or replace the step's screenshot.
    ///
    /// Annotations are defined relative to one specific image, so a
    /// replacement invalidates and clears all of them.
    pub fn set_image(&mut self, image: EncodedImage) {
        self.image = Some(image);
        self.annotations.clear();
    }

    /// Add an annotation with a freshly allocated timestamp id and
    /// return that id.
    pub fn add_annotation(&mut self, shape: Shape) -> u64 {
        let max_id = self.annotations.iter().map(|a| a.id).max().unwrap_or(0);
        let id = timestamp_id(max_id);
        self.annotations.push(Annotation::new(id, shape));
        id
    }

    /// Remove an annotation by id. Returns whether one was removed.
    pub fn remove_annotation(&mut self, id: u64) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        self.annotations.len() != before
    }
}

/// Build a solid-white PNG test image. Shared by compositor and export tests.
#[cfg(test)]
pub(crate) fn test_image(width: u32, height: u32) -> EncodedImage {
    use image::{Rgba, RgbaImage};

    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    EncodedImage::from_bytes(bytes).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_probes_dimensions() {
        let img = test_image(400, 300);
        assert_eq!((img.width, img.height), (400, 300));
        assert_eq!(img.mime_type(), "image/png");
    }

    #[test]
    fn from_bytes_rejects_non_image_data() {
        assert!(EncodedImage::from_bytes(b"not an image at all".to_vec()).is_err());
    }

    #[test]
    fn replacing_image_clears_annotations() {
        let mut step = Step::new(1, "Step");
        step.set_image(test_image(100, 100));
        step.add_annotation(Shape::Click { x: 50.0, y: 50.0 });
        step.add_annotation(Shape::Arrow {
            x1: 10.0,
            y1: 10.0,
            x2: 90.0,
            y2: 90.0,
        });
        assert_eq!(step.annotations.len(), 2);

        step.set_image(test_image(200, 200));
        assert!(step.annotations.is_empty());
    }

    #[test]
    fn annotation_ids_are_unique() {
        let mut step = Step::new(1, "Step");
        step.set_image(test_image(100, 100));
        let a = step.add_annotation(Shape::Click { x: 1.0, y: 1.0 });
        let b = step.add_annotation(Shape::Click { x: 2.0, y: 2.0 });
        let c = step.add_annotation(Shape::Click { x: 3.0, y: 3.0 });
        assert!(a < b && b < c);
    }

    #[test]
    fn remove_annotation_by_id() {
        let mut step = Step::new(1, "Step");
        step.set_image(test_image(100, 100));
        let id = step.add_annotation(Shape::Click { x: 50.0, y: 50.0 });
        assert!(step.remove_annotation(id));
        assert!(!step.remove_annotation(id));
        assert!(step.annotations.is_empty());
    }

    #[test]
    fn image_round_trips_through_json() {
        let mut step = Step::new(7, "Upload");
        step.set_image(test_image(32, 16));
        let json = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
