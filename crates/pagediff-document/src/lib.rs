// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagediff-document — Page-level visual comparison of two PDF documents.
//
// Provides PDF handles and the `pdftoppm` rasterizer adapter, bitmap
// normalization, SSIM scoring and difference highlighting, and the
// page-set reconciliation that produces a run's artifacts and result record.

pub mod compare;
pub mod image;
pub mod pdf;

// Re-export the primary entry points so callers can use
// `pagediff_document::compare_files` etc.
pub use compare::{
    ArtifactSink, DirectorySink, PageSetReconciler, compare_files, compare_sources, render_summary,
};
pub use crate::image::{Bitmap, Highlighter, SsimScorer};
pub use pdf::{InMemoryDocument, PageSource, PdfDocument, Rasterizer};
