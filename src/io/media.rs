// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Screenshot loading.

use crate::models::step::EncodedImage;
use anyhow::Context;
use std::path::Path;

/// Extensions offered in the image picker dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// A screenshot read from disk: the original encoded bytes for storage
/// plus decoded RGBA pixels for display.
pub struct LoadedImage {
    pub encoded: EncodedImage,
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Read and decode a screenshot file.
pub fn load_image(path: &Path) -> anyhow::Result<LoadedImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let decoded = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    Ok(LoadedImage {
        encoded: EncodedImage::from_bytes(bytes)?,
        pixels: decoded.into_raw(),
        width,
        height,
    })
}

/// Decode stored image bytes for display.
pub fn decode_for_display(image: &EncodedImage) -> anyhow::Result<LoadedImage> {
    let decoded = image::load_from_memory(&image.bytes)
        .context("failed to decode stored image")?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(LoadedImage {
        encoded: image.clone(),
        pixels: decoded.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::step::test_image;
    use std::io::Write;

    #[test]
    fn load_image_keeps_original_bytes_and_decodes_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let encoded = test_image(6, 4);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&encoded.bytes).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.encoded.bytes, encoded.bytes);
        assert_eq!((loaded.width, loaded.height), (6, 4));
        assert_eq!(loaded.pixels.len(), 6 * 4 * 4);
        // Solid white source.
        assert_eq!(&loaded.pixels[..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn stored_image_decodes_for_display() {
        let loaded = decode_for_display(&test_image(3, 5)).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 5));
        assert_eq!(loaded.pixels.len(), 3 * 5 * 4);
    }
}
