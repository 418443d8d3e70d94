// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures and the drawing gesture state machine.
//!
//! Annotations are stored in percentage coordinates (0-100 of image
//! width/height), so the same record renders correctly in the editor,
//! the inline preview, and the export compositor regardless of the
//! displayed size of the image.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Minimum width/height (in percent units) for a committed highlight box.
pub const MIN_HIGHLIGHT_SIZE: f32 = 1.0;

/// Minimum start-to-end distance (in percent units) for a committed arrow.
pub const MIN_ARROW_LENGTH: f32 = 2.0;

/// Annotation tools available in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Place a click marker at the release position
    #[default]
    Click,
    /// Drag out a highlight rectangle
    Highlight,
    /// Drag an arrow from start to end
    Arrow,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Click => "Click",
            Tool::Highlight => "Highlight",
            Tool::Arrow => "Arrow",
        }
    }

    /// Get all available tools in toolbar order.
    pub fn all() -> &'static [Tool] {
        &[Tool::Click, Tool::Highlight, Tool::Arrow]
    }

    /// Whether this tool commits through a press-drag-release gesture.
    pub fn is_drag_tool(&self) -> bool {
        !matches!(self, Tool::Click)
    }
}

/// Shape geometry for an annotation, in percent coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Point marker at the clicked position.
    Click { x: f32, y: f32 },
    /// Rectangle stored as center plus size.
    Highlight { cx: f32, cy: f32, w: f32, h: f32 },
    /// Line segment with explicit start and end points.
    Arrow { x1: f32, y1: f32, x2: f32, y2: f32 },
}

/// A committed annotation attached to one step's image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier, derived from the creation timestamp.
    pub id: u64,
    /// The shape geometry.
    pub shape: Shape,
}

impl Annotation {
    /// Create a new annotation with the given id and shape.
    pub fn new(id: u64, shape: Shape) -> Self {
        Self { id, shape }
    }
}

/// Allocate an annotation id from the current wall clock (milliseconds).
///
/// Bumped past `existing_max` if the clock has not advanced since the
/// last allocation, so ids stay unique within a session.
pub fn timestamp_id(existing_max: u64) -> u64 {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    now_ms.max(existing_max + 1)
}

/// State of the drawing gesture in the annotation editor.
///
/// One value instead of separate tool/drawing/position flags, so the
/// gesture cannot end up half-reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Press-drag in progress for a drag tool.
    Dragging {
        tool: Tool,
        start: (f32, f32),
        current: (f32, f32),
    },
}

impl DrawState {
    /// Begin a drag gesture at the given percent coordinates.
    ///
    /// The click tool commits on release without a drag phase, so it
    /// never enters `Dragging`.
    pub fn begin(&mut self, tool: Tool, at: (f32, f32)) {
        if tool.is_drag_tool() {
            *self = DrawState::Dragging {
                tool,
                start: at,
                current: at,
            };
        }
    }

    /// Update the live endpoint of an in-progress gesture.
    pub fn update(&mut self, at: (f32, f32)) {
        if let DrawState::Dragging { current, .. } = self {
            *current = at;
        }
    }

    /// Discard any in-progress gesture (tool switch, editor close).
    pub fn cancel(&mut self) {
        *self = DrawState::Idle;
    }

    /// Whether a gesture is currently in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self, DrawState::Dragging { .. })
    }

    /// End the gesture and produce the committed shape, if the gesture
    /// passes the minimum-size rules:
    ///
    /// - highlights are discarded when either dimension is under
    ///   [`MIN_HIGHLIGHT_SIZE`] percent (stray clicks with the tool active);
    /// - arrows are discarded when shorter than [`MIN_ARROW_LENGTH`]
    ///   percent.
    pub fn finish(&mut self) -> Option<Shape> {
        let state = std::mem::take(self);
        let DrawState::Dragging {
            tool,
            start,
            current,
        } = state
        else {
            return None;
        };

        match tool {
            Tool::Click => None,
            Tool::Highlight => {
                let w = (current.0 - start.0).abs();
                let h = (current.1 - start.1).abs();
                if w < MIN_HIGHLIGHT_SIZE || h < MIN_HIGHLIGHT_SIZE {
                    return None;
                }
                Some(Shape::Highlight {
                    cx: start.0.min(current.0) + w / 2.0,
                    cy: start.1.min(current.1) + h / 2.0,
                    w,
                    h,
                })
            }
            Tool::Arrow => {
                let dx = current.0 - start.0;
                let dy = current.1 - start.1;
                if (dx * dx + dy * dy).sqrt() < MIN_ARROW_LENGTH {
                    return None;
                }
                Some(Shape::Arrow {
                    x1: start.0,
                    y1: start.1,
                    x2: current.0,
                    y2: current.1,
                })
            }
        }
    }
}
