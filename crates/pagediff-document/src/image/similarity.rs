// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Similarity scorer — multichannel structural similarity (SSIM) between two
// same-size RGB bitmaps.
//
// Follows the usual multichannel definition: each channel gets its own SSIM
// map from a uniform sliding window (sample-normalised variances and
// covariance, K1 = 0.01, K2 = 0.03), the map is averaged over every window
// that lies fully inside the image, and the per-channel means are averaged.
// Window sums come from summed-area tables, so the cost per window is
// constant regardless of window size.

use pagediff_core::error::PageDiffError;
use tracing::{debug, instrument};

use super::Bitmap;

/// Side length of the square sliding window.
pub const DEFAULT_WINDOW: u32 = 7;

/// Dynamic range of an 8-bit channel.
pub const DATA_RANGE: f64 = 255.0;

const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Computes SSIM scores with a fixed window and data range.
#[derive(Debug, Clone, Copy)]
pub struct SsimScorer {
    window: u32,
    data_range: f64,
}

impl Default for SsimScorer {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            data_range: DATA_RANGE,
        }
    }
}

impl SsimScorer {
    /// Mean SSIM of two same-size bitmaps, in [0, 1].
    ///
    /// Identical bitmaps score exactly 1.0 and the score is symmetric in its
    /// arguments. Bitmaps smaller than the window are scored with the largest
    /// odd window that fits.
    #[instrument(skip_all, fields(width = a.width(), height = a.height()))]
    pub fn score(&self, a: &Bitmap, b: &Bitmap) -> Result<f64, PageDiffError> {
        if a.dimensions() != b.dimensions() {
            return Err(PageDiffError::ImageError(format!(
                "cannot score bitmaps of different sizes: {:?} vs {:?}",
                a.dimensions(),
                b.dimensions()
            )));
        }
        let (width, height) = a.dimensions();
        if width == 0 || height == 0 {
            return Err(PageDiffError::ImageError("cannot score an empty bitmap".into()));
        }
        if a.as_raw() == b.as_raw() {
            return Ok(1.0);
        }

        let window = odd_window(self.window.min(width).min(height));
        let c1 = (K1 * self.data_range).powi(2);
        let c2 = (K2 * self.data_range).powi(2);

        let mut channel_total = 0.0;
        for channel in 0..3 {
            let tables = ChannelTables::build(a, b, channel);
            channel_total += tables.mean_ssim(window, c1, c2);
        }
        let score = (channel_total / 3.0).clamp(0.0, 1.0);

        debug!(window, score, "SSIM computed");
        Ok(score)
    }
}

/// Mean SSIM with the default 7x7 window.
pub fn ssim(a: &Bitmap, b: &Bitmap) -> Result<f64, PageDiffError> {
    SsimScorer::default().score(a, b)
}

fn odd_window(window: u32) -> u32 {
    if window % 2 == 0 { window.saturating_sub(1).max(1) } else { window }
}

// -- Summed-area tables -------------------------------------------------------

/// Summed-area table with a zero-padded first row and column.
///
/// `data[y * stride + x]` holds the sum over the rectangle [0, x) x [0, y).
struct SummedArea {
    stride: usize,
    data: Vec<u64>,
}

impl SummedArea {
    fn new(width: u32, height: u32) -> Self {
        let stride = width as usize + 1;
        Self {
            stride,
            data: vec![0u64; stride * (height as usize + 1)],
        }
    }

    /// Sum of the `size` x `size` window whose top-left pixel is (x, y).
    fn window_sum(&self, x: usize, y: usize, size: usize) -> u64 {
        let (x2, y2) = (x + size, y + size);
        // S = I[y2][x2] - I[y][x2] - I[y2][x] + I[y][x]
        self.data[y2 * self.stride + x2] + self.data[y * self.stride + x]
            - self.data[y * self.stride + x2]
            - self.data[y2 * self.stride + x]
    }
}

/// The five tables SSIM needs for one channel: x, y, x², y² and x·y.
struct ChannelTables {
    width: u32,
    height: u32,
    x: SummedArea,
    y: SummedArea,
    xx: SummedArea,
    yy: SummedArea,
    xy: SummedArea,
}

impl ChannelTables {
    fn build(a: &Bitmap, b: &Bitmap, channel: usize) -> Self {
        let (width, height) = a.dimensions();
        let mut tables = Self {
            width,
            height,
            x: SummedArea::new(width, height),
            y: SummedArea::new(width, height),
            xx: SummedArea::new(width, height),
            yy: SummedArea::new(width, height),
            xy: SummedArea::new(width, height),
        };
        let stride = tables.x.stride;

        for row in 0..height {
            let mut sums = [0u64; 5];
            for col in 0..width {
                let p = a.get_pixel(col, row).0[channel] as u64;
                let q = b.get_pixel(col, row).0[channel] as u64;
                sums[0] += p;
                sums[1] += q;
                sums[2] += p * p;
                sums[3] += q * q;
                sums[4] += p * q;

                let idx = (row as usize + 1) * stride + col as usize + 1;
                let above = row as usize * stride + col as usize + 1;
                for (table, sum) in tables.each_mut().into_iter().zip(sums) {
                    table.data[idx] = sum + table.data[above];
                }
            }
        }

        tables
    }

    fn each_mut(&mut self) -> [&mut SummedArea; 5] {
        [
            &mut self.x,
            &mut self.y,
            &mut self.xx,
            &mut self.yy,
            &mut self.xy,
        ]
    }

    /// Average of the SSIM map over every fully contained window.
    fn mean_ssim(&self, window: u32, c1: f64, c2: f64) -> f64 {
        let size = window as usize;
        let n = (size * size) as f64;
        // Sample (N - 1) normalisation of the variances and covariance.
        let cov_norm = if size > 1 { n / (n - 1.0) } else { 1.0 };

        let mut total = 0.0;
        let mut count = 0u64;
        for y0 in 0..=(self.height - window) as usize {
            for x0 in 0..=(self.width - window) as usize {
                let ux = self.x.window_sum(x0, y0, size) as f64 / n;
                let uy = self.y.window_sum(x0, y0, size) as f64 / n;
                let uxx = self.xx.window_sum(x0, y0, size) as f64 / n;
                let uyy = self.yy.window_sum(x0, y0, size) as f64 / n;
                let uxy = self.xy.window_sum(x0, y0, size) as f64 / n;

                let vx = cov_norm * (uxx - ux * ux);
                let vy = cov_norm * (uyy - uy * uy);
                let vxy = cov_norm * (uxy - ux * uy);

                let numerator = (2.0 * (ux * uy) + c1) * (2.0 * vxy + c2);
                let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
                total += numerator / denominator;
                count += 1;
            }
        }

        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// A page-like bitmap: white background with a few dark "text" bars.
    fn page(width: u32, height: u32, bars: &[(u32, u32, u32)]) -> Bitmap {
        let mut img = Bitmap::from_pixel(width, height, Rgb([255, 255, 255]));
        for &(x, y, len) in bars {
            for dx in 0..len {
                for dy in 0..3 {
                    img.put_pixel(x + dx, y + dy, Rgb([20, 20, 20]));
                }
            }
        }
        img
    }

    fn noise(width: u32, height: u32, seed: u32) -> Bitmap {
        Bitmap::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(73) ^ y.wrapping_mul(151) ^ seed).wrapping_mul(2654435761);
            Rgb([(v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8])
        })
    }

    #[test]
    fn identical_bitmaps_score_exactly_one() {
        let a = noise(40, 30, 1);
        assert_eq!(ssim(&a, &a).unwrap(), 1.0);
        assert_eq!(ssim(&a, &a.clone()).unwrap(), 1.0);
    }

    #[test]
    fn identical_bitmaps_score_one_without_shortcut() {
        // Exercise the window path directly; the formula itself must give 1.0.
        let a = noise(20, 20, 9);
        let c1 = (K1 * DATA_RANGE).powi(2);
        let c2 = (K2 * DATA_RANGE).powi(2);
        let mut total = 0.0;
        for channel in 0..3 {
            total += ChannelTables::build(&a, &a, channel).mean_ssim(7, c1, c2);
        }
        assert_eq!(total / 3.0, 1.0);
    }

    #[test]
    fn score_is_symmetric() {
        let a = page(60, 40, &[(5, 5, 30), (5, 15, 20)]);
        let b = page(60, 40, &[(5, 5, 30), (5, 25, 40)]);
        assert_eq!(ssim(&a, &b).unwrap(), ssim(&b, &a).unwrap());

        let c = noise(33, 21, 4);
        let d = noise(33, 21, 5);
        assert_eq!(ssim(&c, &d).unwrap(), ssim(&d, &c).unwrap());
    }

    #[test]
    fn differing_text_scores_below_one() {
        let a = page(80, 40, &[(10, 10, 40)]);
        let b = page(80, 40, &[(10, 10, 40), (10, 20, 25)]);
        let score = ssim(&a, &b).unwrap();
        assert!(score < 0.999, "score {score}");
        assert!(score > 0.0, "score {score}");
    }

    #[test]
    fn more_change_scores_lower() {
        let base = page(80, 60, &[(10, 10, 50)]);
        let small = page(80, 60, &[(10, 10, 50), (10, 30, 5)]);
        let large = page(80, 60, &[(10, 10, 50), (10, 30, 50), (10, 45, 50)]);
        assert!(ssim(&base, &small).unwrap() > ssim(&base, &large).unwrap());
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let black = Bitmap::from_pixel(16, 16, Rgb([0, 0, 0]));
        let white = Bitmap::from_pixel(16, 16, Rgb([255, 255, 255]));
        let score = ssim(&black, &white).unwrap();
        assert!((0.0..=1.0).contains(&score), "score {score}");

        let original = noise(16, 16, 2);
        let inverted = Bitmap::from_fn(16, 16, |x, y| {
            let p = original.get_pixel(x, y).0;
            Rgb([255 - p[0], 255 - p[1], 255 - p[2]])
        });
        let score = ssim(&original, &inverted).unwrap();
        assert!((0.0..=1.0).contains(&score), "score {score}");
    }

    #[test]
    fn tiny_bitmaps_use_a_smaller_window() {
        let a = Bitmap::from_pixel(3, 5, Rgb([10, 10, 10]));
        let b = Bitmap::from_pixel(3, 5, Rgb([12, 10, 10]));
        let score = ssim(&a, &b).unwrap();
        assert!(score > 0.9 && score < 1.0, "score {score}");

        let one = Bitmap::from_pixel(1, 1, Rgb([0, 0, 0]));
        let other = Bitmap::from_pixel(1, 1, Rgb([0, 0, 1]));
        assert!(ssim(&one, &other).unwrap() < 1.0);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = Bitmap::new(10, 10);
        let b = Bitmap::new(10, 11);
        assert!(matches!(ssim(&a, &b), Err(PageDiffError::ImageError(_))));
    }

    #[test]
    fn even_windows_round_down() {
        assert_eq!(odd_window(8), 7);
        assert_eq!(odd_window(7), 7);
        assert_eq!(odd_window(2), 1);
    }

    #[test]
    fn window_sum_matches_direct_sum() {
        let a = noise(9, 8, 3);
        let tables = ChannelTables::build(&a, &a, 1);
        let mut direct = 0u64;
        for y in 2..5 {
            for x in 4..7 {
                direct += a.get_pixel(x, y).0[1] as u64;
            }
        }
        assert_eq!(tables.x.window_sum(4, 2, 3), direct);
    }
}
