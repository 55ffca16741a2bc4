// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — opening documents, counting pages, and rasterizing pages to
// bitmaps.

pub mod document;
pub mod raster;
pub mod source;

pub use document::PdfDocument;
pub use raster::Rasterizer;
pub use source::{InMemoryDocument, PageSource};
