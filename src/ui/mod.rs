// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the stepscribe application.

pub mod editor;
pub mod header;
pub mod steps_panel;
