// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF document handle — loads the file with `lopdf` to learn its page count
// and delegates page rendering to the rasterizer adapter.

use std::path::{Path, PathBuf};

use lopdf::Document;
use pagediff_core::error::PageDiffError;
use tracing::{debug, info, instrument};

use crate::image::Bitmap;
use crate::pdf::raster::Rasterizer;
use crate::pdf::source::{PageSource, page_out_of_range};

/// An opened PDF file taking part in a comparison.
///
/// The parsed document is owned by the handle and released when it is
/// dropped, on success and error paths alike.
pub struct PdfDocument {
    /// The underlying lopdf document.
    document: Document,
    /// Absolute source path; reported in the result record and handed to the
    /// renderer.
    path: PathBuf,
    rasterizer: Rasterizer,
}

impl PdfDocument {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, rasterizer: Rasterizer) -> Result<Self, PageDiffError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let absolute = std::fs::canonicalize(path_ref).map_err(|err| {
            PageDiffError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        let document = Document::load(&absolute).map_err(|err| {
            PageDiffError::PdfError(format!("failed to parse {}: {}", path_ref.display(), err))
        })?;

        debug!(
            pages = document.get_pages().len(),
            version = %document.version,
            "PDF loaded"
        );

        Ok(Self {
            document,
            path: absolute,
            rasterizer,
        })
    }
}

impl PageSource for PdfDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    fn rasterize(&self, page_index: usize, scale: f32) -> Result<Bitmap, PageDiffError> {
        let count = self.page_count();
        if page_index >= count {
            return Err(page_out_of_range(page_index, count));
        }
        self.rasterizer
            .render_page(&self.path, page_index, 72.0 * scale)
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("path", &self.path)
            .field("pages", &self.page_count())
            .field("rasterizer", &self.rasterizer)
            .finish()
    }
}
