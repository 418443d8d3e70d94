// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate mapping between pointer positions
//! over a displayed image and the percentage coordinates annotations are
//! stored in, plus the arrowhead math shared by the editor overlay and
//! the export compositor.

/// Arrowhead half-angle from the shaft direction (30 degrees).
pub const ARROW_HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

/// Convert a pointer position to percent coordinates (0-100) of the
/// displayed image rectangle.
///
/// Recomputed on every pointer move while a gesture is active; the
/// rectangle changes with window size but the stored percentages do not.
pub fn percent_coords(
    pointer_x: f32,
    pointer_y: f32,
    rect_left: f32,
    rect_top: f32,
    rect_width: f32,
    rect_height: f32,
) -> (f32, f32) {
    (
        (pointer_x - rect_left) / rect_width * 100.0,
        (pointer_y - rect_top) / rect_height * 100.0,
    )
}

/// Convert a percent coordinate to pixels of a dimension.
pub fn percent_to_pixel(pct: f32, dimension: f32) -> f32 {
    pct / 100.0 * dimension
}

/// Compute the two arrowhead endpoints for a chevron head of the given
/// length: short segments from the arrow end back along ±30° from the
/// reversed shaft direction.
///
/// Returns `None` for a degenerate zero-length arrow.
pub fn arrow_head_points(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    head_length: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let dx = x2 - x1;
    let dy = y2 - y1;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let angle = dy.atan2(dx);

    let left = (
        x2 - head_length * (angle - ARROW_HEAD_ANGLE).cos(),
        y2 - head_length * (angle - ARROW_HEAD_ANGLE).sin(),
    );
    let right = (
        x2 - head_length * (angle + ARROW_HEAD_ANGLE).cos(),
        y2 - head_length * (angle + ARROW_HEAD_ANGLE).sin(),
    );
    Some((left, right))
}
