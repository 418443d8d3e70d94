// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for document export.

use thiserror::Error;

/// Errors that can occur while producing an export document.
///
/// Per-step image failures are not represented here: a step whose image
/// cannot be flattened is skipped (logged) so one bad screenshot never
/// aborts a whole export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error while assembling the document in memory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DOCX zip container error
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Image re-encoding failed while preparing an embed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
