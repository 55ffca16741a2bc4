// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bitmap normalizer — brings a candidate page to the reference page's exact
// pixel dimensions so the two can be compared pixel for pixel.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use tracing::{debug, instrument};

use super::Bitmap;

/// Two bitmaps with identical dimensions.
///
/// The reference is never touched; the candidate is borrowed when it already
/// matched and owned when it had to be resampled.
#[derive(Debug)]
pub struct NormalizedPair<'a> {
    pub reference: &'a Bitmap,
    pub candidate: Cow<'a, Bitmap>,
}

impl NormalizedPair<'_> {
    /// Whether the candidate had to be resampled.
    pub fn resampled(&self) -> bool {
        matches!(self.candidate, Cow::Owned(_))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.reference.dimensions()
    }
}

/// Resample `candidate` to the dimensions of `reference` when they differ.
///
/// Lanczos3 keeps edges and text strokes close to their original shape, so
/// the resampling itself does not show up as a difference. Both bitmaps must
/// be non-empty.
#[instrument(skip_all, fields(
    reference = ?reference.dimensions(),
    candidate = ?candidate.dimensions()
))]
pub fn normalize<'a>(reference: &'a Bitmap, candidate: &'a Bitmap) -> NormalizedPair<'a> {
    if reference.dimensions() == candidate.dimensions() {
        return NormalizedPair {
            reference,
            candidate: Cow::Borrowed(candidate),
        };
    }

    let (width, height) = reference.dimensions();
    debug!(width, height, "Resampling candidate to reference size");
    let resized = imageops::resize(candidate, width, height, FilterType::Lanczos3);

    NormalizedPair {
        reference,
        candidate: Cow::Owned(resized),
    }
}
