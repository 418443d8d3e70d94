// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scrollable list of step cards.
//!
//! Each card edits one step in place: title, description, screenshot
//! thumbnail, and the per-step operations (pick image, annotate,
//! AI describe, reorder, delete).

use crate::models::guide::Guide;
use std::collections::HashMap;

/// Result of steps panel interaction.
pub enum StepsAction {
    None,
    AddStep,
    DeleteStep(u64),
    MoveStep { index: usize, up: bool },
    PickImage(u64),
    EditAnnotations(u64),
    Describe(u64),
}

/// Display the step list. Returns the action and whether any step text
/// was edited.
pub fn show(
    ui: &mut egui::Ui,
    guide: &mut Guide,
    textures: &HashMap<u64, egui::TextureHandle>,
    describing_step: Option<u64>,
) -> (StepsAction, bool) {
    let mut action = StepsAction::None;
    let mut changed = false;
    let step_count = guide.steps.len();

    egui::ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
        for (index, step) in guide.steps.iter_mut().enumerate() {
            let frame = egui::Frame::group(ui.style()).inner_margin(10.0);
            frame.show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{}", index + 1))
                            .strong()
                            .size(16.0),
                    );

                    let title = egui::TextEdit::singleline(&mut step.title)
                        .desired_width(240.0)
                        .hint_text("Step title");
                    changed |= ui.add(title).changed();

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🗑").on_hover_text("Delete step").clicked() {
                            action = StepsAction::DeleteStep(step.id);
                        }
                        let down = ui.add_enabled(index + 1 < step_count, egui::Button::new("⬇"));
                        if down.clicked() {
                            action = StepsAction::MoveStep { index, up: false };
                        }
                        let up = ui.add_enabled(index > 0, egui::Button::new("⬆"));
                        if up.clicked() {
                            action = StepsAction::MoveStep { index, up: true };
                        }
                    });
                });

                let description = egui::TextEdit::multiline(&mut step.description)
                    .desired_rows(2)
                    .desired_width(f32::INFINITY)
                    .hint_text("Describe this step...");
                changed |= ui.add(description).changed();

                if let Some(texture) = textures.get(&step.id) {
                    let size = texture.size_vec2();
                    let width = ui.available_width().min(360.0);
                    let scale = width / size.x;
                    let response = ui.add(
                        egui::Image::new(texture)
                            .fit_to_exact_size(egui::vec2(width, size.y * scale))
                            .sense(egui::Sense::click()),
                    );
                    if response.clicked() {
                        action = StepsAction::EditAnnotations(step.id);
                    }
                    response.on_hover_text("Click to annotate");
                }

                ui.horizontal(|ui| {
                    let pick_label = if step.image.is_some() {
                        "Replace image..."
                    } else {
                        "Add image..."
                    };
                    if ui.button(pick_label).clicked() {
                        action = StepsAction::PickImage(step.id);
                    }

                    let has_image = step.image.is_some();
                    if ui
                        .add_enabled(has_image, egui::Button::new("Annotate"))
                        .clicked()
                    {
                        action = StepsAction::EditAnnotations(step.id);
                    }

                    let describing = describing_step == Some(step.id);
                    if ui
                        .add_enabled(has_image && !describing, egui::Button::new("✨ Describe"))
                        .on_hover_text("Generate a description from the screenshot")
                        .clicked()
                    {
                        action = StepsAction::Describe(step.id);
                    }
                    if describing {
                        ui.spinner();
                    }

                    if !step.annotations.is_empty() {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} annotation{}",
                                step.annotations.len(),
                                if step.annotations.len() == 1 { "" } else { "s" }
                            ))
                            .weak(),
                        );
                    }
                });
            });
            ui.add_space(6.0);
        }

        ui.vertical_centered(|ui| {
            if ui.button("➕ Add step").clicked() {
                action = StepsAction::AddStep;
            }
        });
    });

    (action, changed)
}
