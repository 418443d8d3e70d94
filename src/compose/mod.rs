// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export compositor: bakes a step's annotations into its screenshot.
//!
//! [`flatten`] is a pure function of its inputs. Every call decodes the
//! source image, allocates its own drawing surface at the image's native
//! resolution, draws the annotations in list order, and re-encodes to
//! JPEG. All three export formats (and the AI description call) consume
//! the same flattened bitmap.

use crate::models::annotation::{Annotation, Shape};
use crate::models::step::EncodedImage;
use crate::util::geometry::{arrow_head_points, percent_to_pixel};
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;
use tiny_skia::{FillRule, IntSize, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Click marker radius, in output pixels.
pub const CLICK_RADIUS: f32 = 30.0;
/// Click marker stroke width, in output pixels.
pub const CLICK_STROKE: f32 = 8.0;
/// Highlight border stroke width, in output pixels.
pub const HIGHLIGHT_STROKE: f32 = 3.0;
/// Fallback highlight size (pixels) when the stored size is zero.
pub const HIGHLIGHT_FALLBACK: (f32, f32) = (200.0, 50.0);
/// Arrow shaft stroke width, in output pixels.
pub const ARROW_STROKE: f32 = 6.0;
/// Arrowhead segment length, in output pixels.
pub const ARROW_HEAD_LENGTH: f32 = 20.0;
/// JPEG quality for the flattened output.
pub const JPEG_QUALITY: u8 = 80;

// Marker colors, matching the editor overlay palette.
const CLICK_COLOR: (u8, u8, u8) = (249, 115, 22); // orange
const HIGHLIGHT_FILL: (u8, u8, u8, u8) = (250, 204, 21, 102); // yellow, 40%
const HIGHLIGHT_BORDER: (u8, u8, u8) = (234, 179, 8);
const ARROW_COLOR: (u8, u8, u8) = (244, 63, 94); // rose

/// Errors from the flattening pipeline.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The source image bytes could not be decoded. Surfaced to the
    /// caller instead of silently producing a blank image.
    #[error("failed to decode source image: {0}")]
    Decode(#[source] image::ImageError),

    /// The flattened surface could not be encoded to JPEG.
    #[error("failed to encode flattened image: {0}")]
    Encode(#[source] image::ImageError),

    /// The drawing surface could not be allocated.
    #[error("could not allocate a {0}x{1} drawing surface")]
    Surface(u32, u32),
}

/// Flatten annotations into the image, producing JPEG bytes at the
/// image's native resolution.
///
/// Marker sizes (click radius, stroke widths, arrowhead length) are
/// fixed in output pixels, so they do not scale with the source image
/// resolution. With an empty annotation list this is a pure re-encode.
pub fn flatten(image: &EncodedImage, annotations: &[Annotation]) -> Result<Vec<u8>, ComposeError> {
    let decoded = image::load_from_memory(&image.bytes).map_err(ComposeError::Decode)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let size =
        IntSize::from_wh(width, height).ok_or(ComposeError::Surface(width, height))?;
    let mut pixmap = Pixmap::from_vec(rgba.into_raw(), size)
        .ok_or(ComposeError::Surface(width, height))?;

    for annotation in annotations {
        draw_shape(&mut pixmap, annotation.shape, width as f32, height as f32);
    }

    encode_jpeg(pixmap, width, height)
}

/// Draw one annotation onto the surface, converting percent coordinates
/// to native pixels.
fn draw_shape(pixmap: &mut Pixmap, shape: Shape, width: f32, height: f32) {
    match shape {
        Shape::Click { x, y } => {
            let cx = percent_to_pixel(x, width);
            let cy = percent_to_pixel(y, height);

            let mut pb = PathBuilder::new();
            pb.push_circle(cx, cy, CLICK_RADIUS);
            let Some(path) = pb.finish() else { return };

            let mut fill = Paint::default();
            fill.set_color_rgba8(CLICK_COLOR.0, CLICK_COLOR.1, CLICK_COLOR.2, 51);
            fill.anti_alias = true;
            pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);

            let mut stroke_paint = Paint::default();
            stroke_paint.set_color_rgba8(CLICK_COLOR.0, CLICK_COLOR.1, CLICK_COLOR.2, 255);
            stroke_paint.anti_alias = true;
            let stroke = Stroke {
                width: CLICK_STROKE,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), None);
        }
        Shape::Highlight { cx, cy, w, h } => {
            let px = percent_to_pixel(cx, width);
            let py = percent_to_pixel(cy, height);
            // Zero-size records fall back to a fixed box instead of
            // dropping the shape.
            let pw = if w > 0.0 {
                percent_to_pixel(w, width)
            } else {
                HIGHLIGHT_FALLBACK.0
            };
            let ph = if h > 0.0 {
                percent_to_pixel(h, height)
            } else {
                HIGHLIGHT_FALLBACK.1
            };

            let Some(rect) =
                tiny_skia::Rect::from_xywh(px - pw / 2.0, py - ph / 2.0, pw, ph)
            else {
                return;
            };

            let mut fill = Paint::default();
            fill.set_color_rgba8(
                HIGHLIGHT_FILL.0,
                HIGHLIGHT_FILL.1,
                HIGHLIGHT_FILL.2,
                HIGHLIGHT_FILL.3,
            );
            pixmap.fill_rect(rect, &fill, Transform::identity(), None);

            let mut border = Paint::default();
            border.set_color_rgba8(
                HIGHLIGHT_BORDER.0,
                HIGHLIGHT_BORDER.1,
                HIGHLIGHT_BORDER.2,
                255,
            );
            border.anti_alias = true;
            let stroke = Stroke {
                width: HIGHLIGHT_STROKE,
                ..Default::default()
            };
            let path = PathBuilder::from_rect(rect);
            pixmap.stroke_path(&path, &border, &stroke, Transform::identity(), None);
        }
        Shape::Arrow { x1, y1, x2, y2 } => {
            let sx = percent_to_pixel(x1, width);
            let sy = percent_to_pixel(y1, height);
            let ex = percent_to_pixel(x2, width);
            let ey = percent_to_pixel(y2, height);

            let mut pb = PathBuilder::new();
            pb.move_to(sx, sy);
            pb.line_to(ex, ey);
            if let Some(((lx, ly), (rx, ry))) =
                arrow_head_points(sx, sy, ex, ey, ARROW_HEAD_LENGTH)
            {
                pb.move_to(ex, ey);
                pb.line_to(lx, ly);
                pb.move_to(ex, ey);
                pb.line_to(rx, ry);
            }
            let Some(path) = pb.finish() else { return };

            let mut paint = Paint::default();
            paint.set_color_rgba8(ARROW_COLOR.0, ARROW_COLOR.1, ARROW_COLOR.2, 255);
            paint.anti_alias = true;
            let stroke = Stroke {
                width: ARROW_STROKE,
                line_cap: LineCap::Round,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

/// Encode the finished surface as JPEG.
fn encode_jpeg(pixmap: Pixmap, width: u32, height: u32) -> Result<Vec<u8>, ComposeError> {
    let rgba = image::RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or(ComposeError::Surface(width, height))?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(ComposeError::Encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::step::test_image;

    fn ann(shape: Shape) -> Annotation {
        Annotation::new(1, shape)
    }

    fn decode(bytes: &[u8]) -> image::RgbImage {
        image::load_from_memory(bytes).unwrap().to_rgb8()
    }

    fn is_orange(p: &image::Rgb<u8>) -> bool {
        p[0] > 180 && p[0] > p[2] + 60
    }

    fn is_rose(p: &image::Rgb<u8>) -> bool {
        p[0] > 180 && p[0] > p[1] + 80 && p[0] > p[2] + 60
    }

    #[test]
    fn output_dimensions_match_native_size() {
        let img = test_image(640, 480);
        let out = flatten(&img, &[ann(Shape::Click { x: 50.0, y: 50.0 })]).unwrap();
        assert_eq!(decode(&out).dimensions(), (640, 480));
    }

    #[test]
    fn empty_annotation_list_is_a_pure_reencode() {
        let img = test_image(400, 300);
        let out = flatten(&img, &[]).unwrap();
        let decoded = decode(&out);
        assert_eq!(decoded.dimensions(), (400, 300));
        // Still white after recompression.
        let p = decoded.get_pixel(200, 150);
        assert!(p[0] > 240 && p[1] > 240 && p[2] > 240);
    }

    #[test]
    fn click_marker_lands_at_scaled_center() {
        // (50,50) percent on 400x300 = pixel (200,150); the stroked ring
        // sits CLICK_RADIUS away from the center.
        let img = test_image(400, 300);
        let out = flatten(&img, &[ann(Shape::Click { x: 50.0, y: 50.0 })]).unwrap();
        let decoded = decode(&out);

        assert!(is_orange(decoded.get_pixel(230, 150)), "right edge of ring");
        assert!(is_orange(decoded.get_pixel(170, 150)), "left edge of ring");
        assert!(is_orange(decoded.get_pixel(200, 120)), "top edge of ring");
        // Well outside the marker stays white.
        let outside = decoded.get_pixel(350, 150);
        assert!(outside[0] > 230 && outside[2] > 230);
    }

    #[test]
    fn arrow_spans_scaled_endpoints() {
        // (10,10)->(90,90) on 1000x1000 = pixels (100,100)->(900,900).
        let img = test_image(1000, 1000);
        let out = flatten(
            &img,
            &[ann(Shape::Arrow {
                x1: 10.0,
                y1: 10.0,
                x2: 90.0,
                y2: 90.0,
            })],
        )
        .unwrap();
        let decoded = decode(&out);

        assert!(is_rose(decoded.get_pixel(100, 100)), "shaft start");
        assert!(is_rose(decoded.get_pixel(500, 500)), "shaft midpoint");
        assert!(is_rose(decoded.get_pixel(900, 900)), "arrowhead tip");
        // Off the diagonal stays white.
        let off = decoded.get_pixel(500, 100);
        assert!(off[0] > 230 && off[2] > 230);
    }

    #[test]
    fn highlight_with_zero_size_uses_fallback_box() {
        let img = test_image(800, 600);
        let out = flatten(
            &img,
            &[ann(Shape::Highlight {
                cx: 50.0,
                cy: 50.0,
                w: 0.0,
                h: 0.0,
            })],
        )
        .unwrap();
        let decoded = decode(&out);

        // A 200x50 box centered at (400,300): inside is tinted yellow,
        // outside the fallback box is untouched.
        let inside = decoded.get_pixel(400, 300);
        assert!(inside[2] < 220, "fill reduces blue channel");
        let outside = decoded.get_pixel(400, 360);
        assert!(outside[2] > 230);
    }

    #[test]
    fn flatten_is_geometrically_idempotent() {
        let img = test_image(400, 300);
        let annotations = [
            ann(Shape::Click { x: 25.0, y: 25.0 }),
            Annotation::new(
                2,
                Shape::Arrow {
                    x1: 10.0,
                    y1: 80.0,
                    x2: 90.0,
                    y2: 20.0,
                },
            ),
        ];
        let first = flatten(&img, &annotations).unwrap();
        let second = flatten(&img, &annotations).unwrap();

        let a = decode(&first);
        let b = decode(&second);
        assert_eq!(a.dimensions(), b.dimensions());
        for &(x, y) in &[(100u32, 75u32), (200, 150), (40, 240), (360, 60)] {
            assert_eq!(a.get_pixel(x, y), b.get_pixel(x, y));
        }
    }

    #[test]
    fn undecodable_image_fails_the_caller() {
        let broken = EncodedImage {
            bytes: b"definitely not pixels".to_vec(),
            width: 100,
            height: 100,
        };
        let err = flatten(&broken, &[]).unwrap_err();
        assert!(matches!(err, ComposeError::Decode(_)));
    }
}
