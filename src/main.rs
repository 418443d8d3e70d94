// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! stepscribe - visual tutorial builder
//!
//! A cross-platform desktop application for building step-by-step
//! software tutorials: annotate screenshots with click markers,
//! highlights and arrows, then export the guide as HTML, DOCX or PDF.

mod app;
mod compose;
mod export;
mod io;
mod models;
mod services;
mod ui;
mod util;

use anyhow::Result;
use app::StepscribeApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("stepscribe - Visual Tutorial Builder"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "stepscribe",
        options,
        Box::new(|_cc| Ok(Box::new(StepscribeApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
