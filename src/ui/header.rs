// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Header bar: guide metadata, save indicator, and export buttons.

use crate::app::SaveStatus;
use crate::export;
use crate::models::guide::Guide;

/// Result of header interaction.
pub enum HeaderAction {
    None,
    /// Export the guide in the format with this id.
    Export(&'static str),
    /// Ask to reset the guide (confirmed separately).
    ResetRequested,
}

/// Display the header bar. Returns the action and whether the guide
/// metadata was edited.
pub fn show(
    ui: &mut egui::Ui,
    guide: &mut Guide,
    save_status: SaveStatus,
    export_busy: bool,
) -> (HeaderAction, bool) {
    let mut action = HeaderAction::None;
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let title = egui::TextEdit::singleline(&mut guide.title)
            .font(egui::TextStyle::Heading)
            .desired_width(260.0)
            .hint_text("Guide title");
        changed |= ui.add(title).changed();

        ui.label("by");
        let author = egui::TextEdit::singleline(&mut guide.author)
            .desired_width(140.0)
            .hint_text("Author");
        changed |= ui.add(author).changed();

        ui.separator();

        let (status_text, status_color) = match save_status {
            SaveStatus::Saved => ("Saved", egui::Color32::from_rgb(100, 180, 100)),
            SaveStatus::Pending => ("Saving...", egui::Color32::from_gray(150)),
            SaveStatus::Error => ("Save failed", egui::Color32::from_rgb(220, 80, 80)),
        };
        ui.label(egui::RichText::new(status_text).color(status_color).weak());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Reset").clicked() {
                action = HeaderAction::ResetRequested;
            }

            ui.separator();

            for exporter in export::all() {
                let label = format!("Export {}", exporter.display_name());
                if ui.add_enabled(!export_busy, egui::Button::new(label)).clicked() {
                    action = HeaderAction::Export(exporter.id());
                }
            }
            if export_busy {
                ui.spinner();
            }
        });
    });

    (action, changed)
}
