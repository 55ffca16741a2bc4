// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer adapter — renders a single PDF page to an RGB bitmap by invoking
// poppler's `pdftoppm` and decoding the PNG it writes to stdout.

use std::path::Path;
use std::process::Command;

use pagediff_core::error::PageDiffError;
use tracing::{debug, instrument};

use crate::image::Bitmap;

/// Renders PDF pages through an external `pdftoppm` executable.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    /// Program name or path of the renderer.
    program: String,
}

impl Rasterizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Render page `page_index` (0-based) of `pdf_path` at `dpi`.
    ///
    /// The caller is responsible for range-checking `page_index` against the
    /// document's page count.
    #[instrument(skip(self, pdf_path), fields(path = %pdf_path.display(), page = page_index + 1))]
    pub fn render_page(
        &self,
        pdf_path: &Path,
        page_index: usize,
        dpi: f32,
    ) -> Result<Bitmap, PageDiffError> {
        // pdftoppm uses 1-based page numbers
        let page_number = page_index + 1;

        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .output()
            .map_err(|err| PageDiffError::Rasterization {
                page: page_number,
                detail: format!("failed to invoke {}: {}", self.program, err),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PageDiffError::Rasterization {
                page: page_number,
                detail: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        let bitmap = decode_page_image(&output.stdout).map_err(|detail| {
            PageDiffError::Rasterization {
                page: page_number,
                detail,
            }
        })?;

        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            "Page rasterized"
        );
        Ok(bitmap)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

/// Decode renderer output into an RGB bitmap, rejecting empty images.
fn decode_page_image(data: &[u8]) -> Result<Bitmap, String> {
    if data.is_empty() {
        return Err("renderer produced no image data".into());
    }
    let bitmap = image::load_from_memory(data)
        .map_err(|err| format!("cannot decode rendered page: {err}"))?
        .to_rgb8();
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err("renderer produced an empty image".into());
    }
    Ok(bitmap)
}
