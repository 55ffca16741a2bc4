// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Difference localizer and highlighter — per-pixel difference mask,
// binarization, bounding region, and a translucent overlay composited onto
// the reference page.
//
// Each stage is a plain function over pixel grids so it can be tested on its
// own; `Highlighter` chains them.

use image::{GrayImage, Luma, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use pagediff_core::error::PageDiffError;
use pagediff_core::{BoundingBox, DiffConfig};
use tracing::{debug, instrument};

use super::Bitmap;

/// Value of a changed pixel in a [`BinaryMask`].
pub const CHANGED: u8 = 255;

/// Largest absolute channel difference of every pixel pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceMask(GrayImage);

impl DifferenceMask {
    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }
}

/// A mask whose pixels are exactly 0 (unchanged) or 255 (changed).
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
    changed: u64,
}

impl BinaryMask {
    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Number of changed pixels.
    pub fn changed_pixels(&self) -> u64 {
        self.changed
    }

    pub fn is_changed(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == CHANGED
    }
}

/// Absolute per-channel difference of two same-size bitmaps, reduced to the
/// largest channel difference per pixel.
pub fn difference_mask(a: &Bitmap, b: &Bitmap) -> Result<DifferenceMask, PageDiffError> {
    if a.dimensions() != b.dimensions() {
        return Err(PageDiffError::ImageError(format!(
            "cannot diff bitmaps of different sizes: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    let mask = GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let Rgb(p) = *a.get_pixel(x, y);
        let Rgb(q) = *b.get_pixel(x, y);
        let delta = p
            .iter()
            .zip(q.iter())
            .map(|(l, r)| l.abs_diff(*r))
            .max()
            .unwrap_or(0);
        Luma([delta])
    });
    Ok(DifferenceMask(mask))
}

/// Mark every pixel whose difference strictly exceeds `threshold`.
pub fn binarize(mask: &DifferenceMask, threshold: u8) -> BinaryMask {
    let mut changed = 0u64;
    let image = GrayImage::from_fn(mask.0.width(), mask.0.height(), |x, y| {
        if mask.0.get_pixel(x, y).0[0] > threshold {
            changed += 1;
            Luma([CHANGED])
        } else {
            Luma([0])
        }
    });
    BinaryMask { image, changed }
}

/// Smallest rectangle enclosing all changed pixels, or `None` if nothing
/// changed.
pub fn bounding_box(mask: &BinaryMask) -> Option<BoundingBox> {
    if mask.changed == 0 {
        return None;
    }

    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    for (x, y, pixel) in mask.image.enumerate_pixels() {
        if pixel.0[0] == CHANGED {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Blend `color` at opacity `alpha` over `base` wherever `mask` is changed.
///
/// The base is treated as fully opaque, so each covered channel becomes
/// `(color * alpha + base * (255 - alpha)) / 255`, rounded to nearest.
/// Pixels outside the mask are copied unchanged.
pub fn composite_overlay(base: &Bitmap, mask: &BinaryMask, color: Rgb<u8>, alpha: u8) -> Bitmap {
    let a = alpha as u32;
    let blend = |over: u8, under: u8| -> u8 {
        ((over as u32 * a + under as u32 * (255 - a) + 127) / 255) as u8
    };

    let mut out = base.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if mask.is_changed(x, y) {
            let Rgb([r, g, b]) = *pixel;
            *pixel = Rgb([
                blend(color.0[0], r),
                blend(color.0[1], g),
                blend(color.0[2], b),
            ]);
        }
    }
    out
}

/// Draw a one-pixel rectangle around `region`.
pub fn outline_region(image: &mut Bitmap, region: BoundingBox, color: Rgb<u8>) {
    let rect = Rect::at(region.x as i32, region.y as i32).of_size(region.width, region.height);
    draw_hollow_rect_mut(image, rect, color);
}

// -- Highlighter --------------------------------------------------------------

/// Knobs for the highlight stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightOptions {
    /// Channel difference a pixel must exceed to count as changed.
    pub pixel_threshold: u8,
    pub color: Rgb<u8>,
    pub alpha: u8,
    /// Also draw the bounding rectangle.
    pub outline: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self::from(&DiffConfig::default())
    }
}

impl From<&DiffConfig> for HighlightOptions {
    fn from(config: &DiffConfig) -> Self {
        Self {
            pixel_threshold: config.pixel_threshold,
            color: Rgb(config.overlay_color),
            alpha: config.overlay_alpha,
            outline: config.outline_regions,
        }
    }
}

/// A highlighted reference page.
#[derive(Debug, Clone)]
pub struct Highlight {
    pub image: Bitmap,
    pub region: BoundingBox,
    pub changed_pixels: u64,
}

/// Localizes differences between a reference page and a candidate page and
/// paints them onto the reference.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    options: HighlightOptions,
}

impl Highlighter {
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    /// Highlight the pixels where `candidate` departs from `reference`.
    ///
    /// Returns `Ok(None)` when no channel difference exceeds the pixel
    /// threshold, which is normal for pages that only differ by antialiasing
    /// noise.
    #[instrument(skip_all, fields(
        width = reference.width(),
        height = reference.height(),
        threshold = self.options.pixel_threshold
    ))]
    pub fn highlight(
        &self,
        reference: &Bitmap,
        candidate: &Bitmap,
    ) -> Result<Option<Highlight>, PageDiffError> {
        let diff = difference_mask(reference, candidate)?;
        let mask = binarize(&diff, self.options.pixel_threshold);

        let Some(region) = bounding_box(&mask) else {
            debug!("No pixel above threshold; nothing to highlight");
            return Ok(None);
        };

        let mut image =
            composite_overlay(reference, &mask, self.options.color, self.options.alpha);
        if self.options.outline {
            outline_region(&mut image, region, self.options.color);
        }

        debug!(
            changed = mask.changed_pixels(),
            x = region.x,
            y = region.y,
            w = region.width,
            h = region.height,
            "Difference region located"
        );

        Ok(Some(Highlight {
            image,
            region,
            changed_pixels: mask.changed_pixels(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> Bitmap {
        Bitmap::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn difference_mask_takes_largest_channel_delta() {
        let a = Bitmap::from_pixel(2, 1, Rgb([10, 100, 200]));
        let mut b = a.clone();
        b.put_pixel(1, 0, Rgb([15, 70, 201]));

        let mask = difference_mask(&a, &b).unwrap();
        assert_eq!(mask.as_gray().get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.as_gray().get_pixel(1, 0).0[0], 30);
    }

    #[test]
    fn difference_mask_rejects_size_mismatch() {
        assert!(difference_mask(&white(3, 3), &white(3, 4)).is_err());
    }

    #[test]
    fn binarize_is_strictly_greater_and_binary() {
        let a = Bitmap::from_pixel(3, 1, Rgb([100, 100, 100]));
        let b = Bitmap::from_fn(3, 1, |x, _| match x {
            0 => Rgb([120, 100, 100]), // exactly 20: unchanged
            1 => Rgb([100, 100, 121]), // 21 in one channel: changed
            _ => Rgb([90, 90, 90]),
        });

        let mask = binarize(&difference_mask(&a, &b).unwrap(), 20);
        assert!(!mask.is_changed(0, 0));
        assert!(mask.is_changed(1, 0));
        assert!(!mask.is_changed(2, 0));
        assert_eq!(mask.changed_pixels(), 1);
        assert!(mask.as_gray().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn bounding_box_encloses_all_changes() {
        let a = white(20, 20);
        let mut b = a.clone();
        b.put_pixel(3, 7, Rgb([0, 0, 0]));
        b.put_pixel(12, 4, Rgb([0, 0, 0]));
        b.put_pixel(8, 15, Rgb([0, 0, 0]));

        let mask = binarize(&difference_mask(&a, &b).unwrap(), 20);
        let bbox = bounding_box(&mask).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 3,
                y: 4,
                width: 10,
                height: 12
            }
        );
    }

    #[test]
    fn bounding_box_of_empty_mask_is_none() {
        let mask = binarize(&difference_mask(&white(5, 5), &white(5, 5)).unwrap(), 20);
        assert_eq!(bounding_box(&mask), None);
    }

    #[test]
    fn composite_blends_only_masked_pixels() {
        let base = white(2, 1);
        let mut other = base.clone();
        other.put_pixel(0, 0, Rgb([0, 0, 0]));
        let mask = binarize(&difference_mask(&base, &other).unwrap(), 20);

        let out = composite_overlay(&base, &mask, Rgb([255, 0, 0]), 128);
        // (255 * 128 + 255 * 127) / 255 = 255; (0 * 128 + 255 * 127) / 255 = 127
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 127, 127]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn composite_extremes() {
        let base = Bitmap::from_pixel(1, 1, Rgb([10, 20, 30]));
        let other = Bitmap::from_pixel(1, 1, Rgb([200, 200, 200]));
        let mask = binarize(&difference_mask(&base, &other).unwrap(), 20);

        let opaque = composite_overlay(&base, &mask, Rgb([1, 2, 3]), 255);
        assert_eq!(opaque.get_pixel(0, 0), &Rgb([1, 2, 3]));
        let clear = composite_overlay(&base, &mask, Rgb([1, 2, 3]), 0);
        assert_eq!(clear.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn sub_threshold_noise_yields_no_highlight() {
        let a = white(16, 16);
        let b = Bitmap::from_fn(16, 16, |x, y| {
            let jitter = ((x + y) % 3) as u8 * 7; // at most 14
            Rgb([255 - jitter, 255, 255 - jitter])
        });

        let highlighter = Highlighter::default();
        assert!(highlighter.highlight(&a, &b).unwrap().is_none());
    }

    #[test]
    fn highlight_overlays_reference_not_candidate() {
        let reference = white(10, 10);
        let mut candidate = reference.clone();
        for x in 2..5 {
            candidate.put_pixel(x, 6, Rgb([0, 0, 255]));
        }

        let hl = Highlighter::default()
            .highlight(&reference, &candidate)
            .unwrap()
            .unwrap();
        assert_eq!(hl.changed_pixels, 3);
        assert_eq!(
            hl.region,
            BoundingBox {
                x: 2,
                y: 6,
                width: 3,
                height: 1
            }
        );
        // Reference white blended with red, not the candidate's blue.
        assert_eq!(hl.image.get_pixel(3, 6), &Rgb([255, 127, 127]));
        assert_eq!(hl.image.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn outline_draws_region_border() {
        let reference = white(12, 12);
        let mut candidate = reference.clone();
        candidate.put_pixel(4, 4, Rgb([0, 0, 0]));
        candidate.put_pixel(8, 9, Rgb([0, 0, 0]));

        let options = HighlightOptions {
            outline: true,
            ..HighlightOptions::default()
        };
        let hl = Highlighter::new(options)
            .highlight(&reference, &candidate)
            .unwrap()
            .unwrap();
        // Border pixel that is not itself a changed pixel.
        assert_eq!(hl.image.get_pixel(8, 4), &Rgb([255, 0, 0]));
        // Interior pixel stays untouched.
        assert_eq!(hl.image.get_pixel(6, 6), &Rgb([255, 255, 255]));
    }

    #[test]
    fn options_follow_config() {
        let config = DiffConfig {
            pixel_threshold: 5,
            overlay_color: [0, 255, 0],
            overlay_alpha: 64,
            outline_regions: true,
            ..DiffConfig::default()
        };
        let options = HighlightOptions::from(&config);
        assert_eq!(options.pixel_threshold, 5);
        assert_eq!(options.color, Rgb([0, 255, 0]));
        assert_eq!(options.alpha, 64);
        assert!(options.outline);
    }
}
