// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — bitmap normalization, SSIM scoring, and difference
// highlighting over in-memory RGB pages.

pub mod highlight;
pub mod normalize;
pub mod similarity;

/// A rasterized page: 8-bit RGB, row-major.
pub type Bitmap = image::RgbImage;

pub use highlight::{BinaryMask, DifferenceMask, Highlight, HighlightOptions, Highlighter};
pub use normalize::{NormalizedPair, normalize};
pub use similarity::{SsimScorer, ssim};
