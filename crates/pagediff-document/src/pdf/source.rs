// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page sources — anything that can report a page count and rasterize a page
// by index. The reconciler only ever talks to this trait.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use pagediff_core::error::PageDiffError;

use crate::image::Bitmap;

/// An open document whose pages can be rendered to bitmaps.
///
/// Implementations must render deterministically: the same page at the same
/// scale always yields the same bitmap.
pub trait PageSource {
    /// Path the document was opened from.
    fn path(&self) -> &Path;

    /// Number of pages; fixed for the lifetime of the handle.
    fn page_count(&self) -> usize;

    /// Render page `page_index` (0-based) at `scale` (1.0 = 72 DPI).
    fn rasterize(&self, page_index: usize, scale: f32) -> Result<Bitmap, PageDiffError>;
}

/// Error returned by every source for an index past the last page.
pub(crate) fn page_out_of_range(page_index: usize, page_count: usize) -> PageDiffError {
    PageDiffError::Rasterization {
        page: page_index + 1,
        detail: format!(
            "page index out of range (document has {} pages)",
            page_count
        ),
    }
}

/// A document made of pages that are already bitmaps.
///
/// Each page is treated as its 1.0-scale rendering; other scales resample it
/// with Lanczos3 so the rendering stays deterministic.
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    path: PathBuf,
    pages: Vec<Bitmap>,
}

impl InMemoryDocument {
    pub fn new(path: impl Into<PathBuf>, pages: Vec<Bitmap>) -> Self {
        Self {
            path: path.into(),
            pages,
        }
    }
}

impl PageSource for InMemoryDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn rasterize(&self, page_index: usize, scale: f32) -> Result<Bitmap, PageDiffError> {
        let page = self
            .pages
            .get(page_index)
            .ok_or_else(|| page_out_of_range(page_index, self.pages.len()))?;

        if (scale - 1.0).abs() < f32::EPSILON {
            return Ok(page.clone());
        }

        let width = ((page.width() as f32 * scale).round() as u32).max(1);
        let height = ((page.height() as f32 * scale).round() as u32).max(1);
        Ok(imageops::resize(page, width, height, FilterType::Lanczos3))
    }
}
