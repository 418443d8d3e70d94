// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: guides, steps, and annotations.

pub mod annotation;
pub mod guide;
pub mod step;
