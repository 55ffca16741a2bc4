// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Comparison configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PageDiffError, Result};

/// Default similarity threshold. Renders that look lossless can still carry
/// sub-pixel noise, so this sits just below 1.0.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.999;

/// Default per-channel difference (out of 255) a pixel must exceed to be
/// highlighted.
pub const DEFAULT_PIXEL_THRESHOLD: u8 = 20;

/// Highest rendering resolution accepted (scale 20). A letter page at this
/// resolution is already about 12k x 16k pixels.
pub const MAX_DPI: f32 = 1440.0;

/// Settings for one comparison run.
///
/// Loaded from JSON with every field optional; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// A page differs when its SSIM score is strictly below this value.
    pub similarity_threshold: f64,
    /// Per-channel absolute difference that marks a pixel as changed.
    pub pixel_threshold: u8,
    /// RGB colour of the highlight overlay.
    pub overlay_color: [u8; 3],
    /// Opacity of the highlight overlay (0 = invisible, 255 = opaque).
    pub overlay_alpha: u8,
    /// Resolution multiplier; 1.0 renders at 72 DPI.
    pub scale: f32,
    /// Draw a rectangle around the bounding region of changed pixels.
    pub outline_regions: bool,
    /// Executable used to rasterize PDF pages.
    pub rasterizer_program: String,
    /// Parent directory for per-run output directories.
    pub output_dir: PathBuf,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
            overlay_color: [255, 0, 0],
            overlay_alpha: 128,
            scale: 1.0,
            outline_regions: false,
            rasterizer_program: "pdftoppm".to_string(),
            output_dir: PathBuf::from("diff_output"),
        }
    }
}

impl DiffConfig {
    /// Read a configuration file. The result is validated before it is
    /// returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            PageDiffError::InvalidConfig(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            PageDiffError::InvalidConfig(format!("cannot parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a comparison meaningless. Runs before
    /// any document is opened.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(PageDiffError::InvalidConfig(format!(
                "similarity threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PageDiffError::InvalidConfig(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if self.dpi() > MAX_DPI {
            return Err(PageDiffError::InvalidConfig(format!(
                "scale {} renders at {} DPI, above the {} DPI limit",
                self.scale,
                self.dpi(),
                MAX_DPI
            )));
        }
        if self.rasterizer_program.trim().is_empty() {
            return Err(PageDiffError::InvalidConfig(
                "rasterizer program must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Rendering resolution implied by `scale`.
    pub fn dpi(&self) -> f32 {
        72.0 * self.scale
    }
}
