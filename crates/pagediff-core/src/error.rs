// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pagediff.

use thiserror::Error;

/// Top-level error type for all pagediff operations.
///
/// Every variant is fatal to a comparison run. The page-count mismatch is not
/// an error at all; it travels as a warning inside the result record.
#[derive(Debug, Error)]
pub enum PageDiffError {
    // -- Input validation --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("page {page} could not be rasterized: {detail}")]
    Rasterization { page: usize, detail: String },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageDiffError>;
