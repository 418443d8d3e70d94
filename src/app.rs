// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait, managing the overall application state and
//! coordinating between the UI components, persistence, and the
//! background tasks (image loading, export, AI description).

use crate::export;
use crate::io::{media, storage};
use crate::models::annotation::{DrawState, Tool};
use crate::models::guide::Guide;
use crate::services::describe;
use crate::ui::{editor, header, steps_panel};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Debounce interval between the last edit and the autosave.
const SAVE_DEBOUNCE: Duration = Duration::from_millis(800);

/// Autosave indicator state shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Pending,
    Error,
}

/// Result of a background image load for one step.
struct LoadedStepImage {
    step_id: u64,
    image: media::LoadedImage,
}

/// Main application state.
pub struct StepscribeApp {
    /// The guide being edited
    guide: Guide,

    /// Autosave state
    save_status: SaveStatus,

    /// Time of the last unsaved edit, if any
    dirty_since: Option<Instant>,

    /// Step currently open in the annotation editor
    editing_step: Option<u64>,

    /// Currently selected annotation tool
    current_tool: Tool,

    /// In-progress drawing gesture
    draw_state: DrawState,

    /// Display textures for step screenshots, by step id
    textures: HashMap<u64, egui::TextureHandle>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedStepImage, String>>>,

    /// Receiver for a running export
    export_task: Option<Receiver<Result<PathBuf, String>>>,

    /// Step id and receiver for a running AI description request
    describe_task: Option<(u64, Receiver<Result<String, String>>)>,

    /// Pending reset confirmation dialog
    confirm_reset: bool,

    /// Error message dialog
    error_message: Option<String>,
}

impl Default for StepscribeApp {
    fn default() -> Self {
        Self::new()
    }
}

impl StepscribeApp {
    /// Create the application, loading the saved guide if one exists.
    pub fn new() -> Self {
        let guide = match storage::load() {
            Ok(Some(guide)) => {
                log::info!("Loaded guide with {} steps", guide.steps.len());
                guide
            }
            Ok(None) => {
                log::info!("No saved guide, starting fresh");
                Guide::starter()
            }
            Err(e) => {
                log::error!("Failed to load saved guide: {}", e);
                Guide::starter()
            }
        };

        Self {
            guide,
            save_status: SaveStatus::Saved,
            dirty_since: None,
            editing_step: None,
            current_tool: Tool::default(),
            draw_state: DrawState::Idle,
            textures: HashMap::new(),
            image_loader: None,
            export_task: None,
            describe_task: None,
            confirm_reset: false,
            error_message: None,
        }
    }

    /// Record an edit; the autosave fires after the debounce interval.
    fn mark_dirty(&mut self) {
        self.dirty_since = Some(Instant::now());
        self.save_status = SaveStatus::Pending;
    }

    /// Save now if the debounce interval has elapsed.
    fn autosave_if_due(&mut self) {
        let Some(since) = self.dirty_since else {
            return;
        };
        if since.elapsed() < SAVE_DEBOUNCE {
            return;
        }
        self.dirty_since = None;
        self.save_now();
    }

    fn save_now(&mut self) {
        match storage::save(&self.guide) {
            Ok(()) => {
                self.save_status = SaveStatus::Saved;
            }
            Err(e) => {
                log::error!("Failed to save guide: {}", e);
                self.save_status = SaveStatus::Error;
                self.error_message = Some(format!("Failed to save guide: {e}"));
            }
        }
    }

    /// Create display textures for any step image that does not have one
    /// yet (after startup load or an image replacement).
    fn ensure_textures(&mut self, ctx: &egui::Context) {
        for step in &self.guide.steps {
            let Some(ref image) = step.image else { continue };
            if self.textures.contains_key(&step.id) {
                continue;
            }
            match media::decode_for_display(image) {
                Ok(loaded) => {
                    self.textures
                        .insert(step.id, make_texture(ctx, step.id, &loaded));
                }
                Err(e) => {
                    log::error!("Failed to decode image of step {}: {}", step.id, e);
                }
            }
        }
        // Drop textures for deleted steps.
        let live: Vec<u64> = self.guide.steps.iter().map(|s| s.id).collect();
        self.textures.retain(|id, _| live.contains(id));
    }

    /// Open a file picker and load the chosen screenshot for a step
    /// (asynchronously).
    fn pick_image(&mut self, step_id: u64) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", media::IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);

        std::thread::spawn(move || {
            let result = media::load_image(&path)
                .map(|image| {
                    log::info!(
                        "Loaded image: {} ({}x{})",
                        path.display(),
                        image.width,
                        image.height
                    );
                    LoadedStepImage { step_id, image }
                })
                .map_err(|e| format!("Failed to load image: {e:#}"));
            let _ = sender.send(result);
        });
    }

    /// Export the guide in the given format (asynchronously after the
    /// save dialog).
    fn export_guide(&mut self, format_id: &str) {
        let Some(exporter) = export::all().into_iter().find(|e| e.id() == format_id) else {
            log::error!("Unknown export format: {}", format_id);
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter(exporter.display_name(), &[exporter.extension()])
            .set_file_name(export::download_file_name(
                &self.guide.title,
                exporter.extension(),
            ))
            .save_file()
        else {
            return;
        };

        let guide = self.guide.clone();
        let (sender, receiver) = channel();
        self.export_task = Some(receiver);

        std::thread::spawn(move || {
            let result = exporter
                .export(&guide)
                .map_err(|e| format!("Export failed: {e}"))
                .and_then(|bytes| {
                    std::fs::write(&path, bytes)
                        .map(|_| path.clone())
                        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
                });
            let _ = sender.send(result);
        });
    }

    /// Request an AI description of a step's screenshot (asynchronously).
    fn describe_step(&mut self, step_id: u64) {
        let config = match describe::DescribeConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                self.error_message = Some(e.to_string());
                return;
            }
        };
        let Some(step) = self.guide.step(step_id) else {
            return;
        };
        let Some(image) = step.image.clone() else {
            return;
        };
        let annotations = step.annotations.clone();

        let (sender, receiver) = channel();
        self.describe_task = Some((step_id, receiver));

        std::thread::spawn(move || {
            // The model sees the same flattened image the exports embed.
            let result = crate::compose::flatten(&image, &annotations)
                .map_err(|e| format!("Failed to prepare image: {e}"))
                .and_then(|jpeg| {
                    describe::describe_step_image(&config, &jpeg)
                        .map_err(|e| format!("Description request failed: {e}"))
                });
            let _ = sender.send(result);
        });
    }

    fn reset_guide(&mut self) {
        if let Err(e) = storage::reset() {
            log::error!("Failed to delete saved guide: {}", e);
        }
        self.guide = Guide::starter();
        self.textures.clear();
        self.editing_step = None;
        self.draw_state = DrawState::Idle;
        self.dirty_since = None;
        self.save_status = SaveStatus::Saved;
        log::info!("Guide reset to starter state");
    }

    /// Poll the background task channels.
    fn poll_tasks(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.image_loader {
            if let Ok(result) = receiver.try_recv() {
                self.image_loader = None;
                match result {
                    Ok(loaded) => {
                        let texture = make_texture(ctx, loaded.step_id, &loaded.image);
                        if let Some(step) = self.guide.step_mut(loaded.step_id) {
                            step.set_image(loaded.image.encoded);
                            self.textures.insert(loaded.step_id, texture);
                            self.mark_dirty();
                        }
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        self.error_message = Some(e);
                    }
                }
            }
        }

        if let Some(ref receiver) = self.export_task {
            if let Ok(result) = receiver.try_recv() {
                self.export_task = None;
                match result {
                    Ok(path) => log::info!("Exported guide to {}", path.display()),
                    Err(e) => {
                        log::error!("{}", e);
                        self.error_message = Some(e);
                    }
                }
            }
        }

        if let Some((step_id, ref receiver)) = self.describe_task {
            if let Ok(result) = receiver.try_recv() {
                self.describe_task = None;
                match result {
                    Ok(text) => {
                        if let Some(step) = self.guide.step_mut(step_id) {
                            step.description = text;
                            self.mark_dirty();
                        }
                    }
                    // Description failures degrade silently; the step
                    // keeps whatever text it had.
                    Err(e) => log::error!("{}", e),
                }
            }
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if self.confirm_reset {
            egui::Window::new("Reset guide?")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("This deletes the saved guide and all its steps.");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Reset").clicked() {
                            self.reset_guide();
                            self.confirm_reset = false;
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_reset = false;
                        }
                    });
                });
        }

        if let Some(message) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }
    }
}

/// Build an egui texture from decoded RGBA pixels.
fn make_texture(
    ctx: &egui::Context,
    step_id: u64,
    loaded: &media::LoadedImage,
) -> egui::TextureHandle {
    let size = [loaded.width as usize, loaded.height as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
    ctx.load_texture(
        format!("step_{step_id}"),
        color_image,
        egui::TextureOptions::LINEAR,
    )
}

impl eframe::App for StepscribeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_tasks(ctx);
        self.ensure_textures(ctx);
        self.autosave_if_due(); // may save before the UI below marks new edits

        let busy = self.image_loader.is_some()
            || self.export_task.is_some()
            || self.describe_task.is_some();
        if busy {
            ctx.request_repaint();
        } else if self.dirty_since.is_some() {
            ctx.request_repaint_after(SAVE_DEBOUNCE);
        }

        // Header (top)
        let (header_action, header_changed) = egui::TopBottomPanel::top("header")
            .show(ctx, |ui| {
                header::show(
                    ui,
                    &mut self.guide,
                    self.save_status,
                    self.export_task.is_some(),
                )
            })
            .inner;

        if header_changed {
            self.mark_dirty();
        }
        match header_action {
            header::HeaderAction::Export(format_id) => {
                self.export_guide(format_id);
            }
            header::HeaderAction::ResetRequested => {
                self.confirm_reset = true;
            }
            header::HeaderAction::None => {}
        }

        // Step list (center)
        let describing = self.describe_task.as_ref().map(|(id, _)| *id);
        let (steps_action, steps_changed) = egui::CentralPanel::default()
            .show(ctx, |ui| {
                steps_panel::show(ui, &mut self.guide, &self.textures, describing)
            })
            .inner;

        if steps_changed {
            self.mark_dirty();
        }
        match steps_action {
            steps_panel::StepsAction::AddStep => {
                let id = self.guide.add_step();
                log::info!("Added step {}", id);
                self.mark_dirty();
            }
            steps_panel::StepsAction::DeleteStep(id) => {
                if self.guide.delete_step(id) {
                    self.textures.remove(&id);
                    if self.editing_step == Some(id) {
                        self.editing_step = None;
                        self.draw_state = DrawState::Idle;
                    }
                    log::info!("Deleted step {}", id);
                    self.mark_dirty();
                }
            }
            steps_panel::StepsAction::MoveStep { index, up } => {
                self.guide.move_step(index, up);
                self.mark_dirty();
            }
            steps_panel::StepsAction::PickImage(id) => {
                self.pick_image(id);
            }
            steps_panel::StepsAction::EditAnnotations(id) => {
                self.editing_step = Some(id);
                self.draw_state = DrawState::Idle;
            }
            steps_panel::StepsAction::Describe(id) => {
                self.describe_step(id);
            }
            steps_panel::StepsAction::None => {}
        }

        // Annotation editor (modal window)
        if let Some(step_id) = self.editing_step {
            let editor_action = match (self.guide.step(step_id), self.textures.get(&step_id)) {
                (Some(step), Some(texture)) => {
                    let texture = texture.clone();
                    editor::show(
                        ctx,
                        step,
                        &texture,
                        &mut self.current_tool,
                        &mut self.draw_state,
                    )
                }
                _ => editor::EditorAction::Close,
            };

            match editor_action {
                editor::EditorAction::AddAnnotation(shape) => {
                    if let Some(step) = self.guide.step_mut(step_id) {
                        let id = step.add_annotation(shape);
                        log::info!("Added annotation {} to step {}", id, step_id);
                        self.mark_dirty();
                    }
                }
                editor::EditorAction::RemoveAnnotation(id) => {
                    if let Some(step) = self.guide.step_mut(step_id) {
                        if step.remove_annotation(id) {
                            log::info!("Removed annotation {} from step {}", id, step_id);
                            self.mark_dirty();
                        }
                    }
                }
                editor::EditorAction::Close => {
                    self.editing_step = None;
                    self.draw_state = DrawState::Idle;
                }
                editor::EditorAction::None => {}
            }
        }

        self.show_dialogs(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.dirty_since.take().is_some() {
            self.save_now();
        }
    }
}
