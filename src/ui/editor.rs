// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation editor window.
//!
//! Shows one step's screenshot at display size with the annotation
//! overlay, and handles the pointer gestures that create annotations.
//! Marker geometry is stored in percent coordinates of the source
//! image, so the overlay rescales with the window while commits stay
//! resolution-independent.

use crate::compose;
use crate::models::annotation::{DrawState, Shape, Tool};
use crate::models::step::Step;
use crate::util::geometry;

/// Result of editor interaction.
pub enum EditorAction {
    None,
    Close,
    AddAnnotation(Shape),
    RemoveAnnotation(u64),
}

const CLICK_COLOR: egui::Color32 = egui::Color32::from_rgb(249, 115, 22);
const HIGHLIGHT_FILL: egui::Color32 =
    egui::Color32::from_rgba_premultiplied(100, 82, 8, 102);
const HIGHLIGHT_BORDER: egui::Color32 = egui::Color32::from_rgb(234, 179, 8);
const ARROW_COLOR: egui::Color32 = egui::Color32::from_rgb(244, 63, 94);

/// Display the editor window for a step.
pub fn show(
    ctx: &egui::Context,
    step: &Step,
    texture: &egui::TextureHandle,
    tool: &mut Tool,
    draw: &mut DrawState,
) -> EditorAction {
    let mut action = EditorAction::None;
    let mut open = true;

    egui::Window::new(format!("Annotate: {}", step.title))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(720.0)
        .show(ctx, |ui| {
            show_toolbar(ui, tool, draw);
            ui.separator();

            let texture_size = texture.size_vec2();
            let available = egui::vec2(ui.available_width(), 480.0);
            let scale = (available.x / texture_size.x)
                .min(available.y / texture_size.y)
                .min(1.0);
            let display_size = texture_size * scale;

            let (image_rect, response) =
                ui.allocate_exact_size(display_size, egui::Sense::click_and_drag());
            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let to_percent = |pos: egui::Pos2| {
                geometry::percent_coords(
                    pos.x,
                    pos.y,
                    image_rect.min.x,
                    image_rect.min.y,
                    image_rect.width(),
                    image_rect.height(),
                )
            };

            if response.drag_started() {
                if let Some(pos) = response.interact_pointer_pos() {
                    draw.begin(*tool, to_percent(pos));
                }
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    draw.update(to_percent(pos));
                }
            }
            if response.drag_stopped() {
                if let Some(pos) = response.interact_pointer_pos() {
                    draw.update(to_percent(pos));
                }
                if let Some(shape) = draw.finish() {
                    action = EditorAction::AddAnnotation(shape);
                }
            }
            // The click tool commits at the release position.
            if response.clicked() && *tool == Tool::Click {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (x, y) = to_percent(pos);
                    action = EditorAction::AddAnnotation(Shape::Click { x, y });
                }
            }

            // Committed annotations, then the live preview on top.
            let painter = ui.painter_at(image_rect);
            for annotation in &step.annotations {
                draw_shape(&painter, &annotation.shape, image_rect, scale);
            }
            if let DrawState::Dragging {
                tool: drag_tool,
                start,
                current,
            } = *draw
            {
                draw_preview(&painter, drag_tool, start, current, image_rect, scale);
            }

            ui.separator();
            if step.annotations.is_empty() {
                ui.label(
                    egui::RichText::new(match tool {
                        Tool::Click => "Click anywhere on the image to place a click marker",
                        Tool::Highlight => "Drag a box over the area to highlight",
                        Tool::Arrow => "Drag from the arrow tail to its tip",
                    })
                    .italics()
                    .weak(),
                );
            } else {
                ui.horizontal_wrapped(|ui| {
                    for annotation in &step.annotations {
                        ui.label(shape_summary(&annotation.shape));
                        if ui.small_button("✕").on_hover_text("Remove").clicked() {
                            action = EditorAction::RemoveAnnotation(annotation.id);
                        }
                        ui.add_space(8.0);
                    }
                });
            }
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        if draw.is_dragging() {
            draw.cancel();
        } else {
            open = false;
        }
    }

    if !open {
        draw.cancel();
        return EditorAction::Close;
    }
    action
}

fn show_toolbar(ui: &mut egui::Ui, tool: &mut Tool, draw: &mut DrawState) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;
        ui.label("Tools:");
        ui.separator();

        for &candidate in Tool::all() {
            let icon = match candidate {
                Tool::Click => "⊙",
                Tool::Highlight => "▭",
                Tool::Arrow => "↗",
            };
            let label = format!("{} {}", icon, candidate.name());
            if ui.selectable_label(*tool == candidate, label).clicked() && *tool != candidate {
                *tool = candidate;
                draw.cancel();
            }
        }
    });
}

/// Draw a committed shape over the displayed image. `scale` maps source
/// image pixels to screen pixels, keeping the overlay in register with
/// what the compositor will bake in.
fn draw_shape(painter: &egui::Painter, shape: &Shape, image_rect: egui::Rect, scale: f32) {
    let at = |x_pct: f32, y_pct: f32| {
        egui::pos2(
            image_rect.min.x + geometry::percent_to_pixel(x_pct, image_rect.width()),
            image_rect.min.y + geometry::percent_to_pixel(y_pct, image_rect.height()),
        )
    };

    match *shape {
        Shape::Click { x, y } => {
            let center = at(x, y);
            let radius = compose::CLICK_RADIUS * scale;
            painter.circle_filled(center, radius, CLICK_COLOR.gamma_multiply(0.2));
            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(compose::CLICK_STROKE * scale, CLICK_COLOR),
            );
        }
        Shape::Highlight { cx, cy, w, h } => {
            let (w_px, h_px) = if w <= 0.0 || h <= 0.0 {
                let (fw, fh) = compose::HIGHLIGHT_FALLBACK;
                (fw * scale, fh * scale)
            } else {
                (
                    geometry::percent_to_pixel(w, image_rect.width()),
                    geometry::percent_to_pixel(h, image_rect.height()),
                )
            };
            let rect = egui::Rect::from_center_size(at(cx, cy), egui::vec2(w_px, h_px));
            painter.rect_filled(rect, 2.0, HIGHLIGHT_FILL);
            painter.rect_stroke(
                rect,
                2.0,
                egui::Stroke::new(compose::HIGHLIGHT_STROKE * scale, HIGHLIGHT_BORDER),
            );
        }
        Shape::Arrow { x1, y1, x2, y2 } => {
            let tail = at(x1, y1);
            let tip = at(x2, y2);
            let stroke = egui::Stroke::new(compose::ARROW_STROKE * scale, ARROW_COLOR);
            painter.line_segment([tail, tip], stroke);
            if let Some((left, right)) = geometry::arrow_head_points(
                tail.x,
                tail.y,
                tip.x,
                tip.y,
                compose::ARROW_HEAD_LENGTH * scale,
            ) {
                painter.line_segment([tip, egui::pos2(left.0, left.1)], stroke);
                painter.line_segment([tip, egui::pos2(right.0, right.1)], stroke);
            }
        }
    }
}

/// Draw the in-progress gesture translucently.
fn draw_preview(
    painter: &egui::Painter,
    tool: Tool,
    start: (f32, f32),
    current: (f32, f32),
    image_rect: egui::Rect,
    scale: f32,
) {
    let at = |x_pct: f32, y_pct: f32| {
        egui::pos2(
            image_rect.min.x + geometry::percent_to_pixel(x_pct, image_rect.width()),
            image_rect.min.y + geometry::percent_to_pixel(y_pct, image_rect.height()),
        )
    };

    match tool {
        Tool::Click => {}
        Tool::Highlight => {
            let rect = egui::Rect::from_two_pos(at(start.0, start.1), at(current.0, current.1));
            painter.rect_filled(rect, 2.0, HIGHLIGHT_FILL.gamma_multiply(0.5));
            painter.rect_stroke(
                rect,
                2.0,
                egui::Stroke::new(1.0, HIGHLIGHT_BORDER.gamma_multiply(0.7)),
            );
        }
        Tool::Arrow => {
            let stroke = egui::Stroke::new(
                compose::ARROW_STROKE * scale,
                ARROW_COLOR.gamma_multiply(0.5),
            );
            painter.line_segment([at(start.0, start.1), at(current.0, current.1)], stroke);
        }
    }
}

fn shape_summary(shape: &Shape) -> String {
    match *shape {
        Shape::Click { x, y } => format!("Click ({x:.0}%, {y:.0}%)"),
        Shape::Highlight { w, h, .. } => format!("Highlight {w:.0}×{h:.0}%"),
        Shape::Arrow { .. } => "Arrow".to_string(),
    }
}
