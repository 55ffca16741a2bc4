// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-page hot path in pagediff-document:
// SSIM scoring, difference highlighting, and size normalization on synthetic
// letter-sized pages.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::Rgb;

use pagediff_document::image::{HighlightOptions, Highlighter, SsimScorer, normalize};
use pagediff_document::Bitmap;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 612x792 page (US letter at 72 dpi) with dark "text" bars every 14 rows.
///
/// `shift` moves every bar down, giving a candidate page that differs from
/// the reference everywhere text appears.
fn synthetic_page(shift: u32) -> Bitmap {
    let mut page = Bitmap::from_pixel(612, 792, Rgb([255, 255, 255]));
    let mut y = 40 + shift;
    while y + 6 < 752 {
        for x in 54..558 {
            for dy in 0..6 {
                page.put_pixel(x, y + dy, Rgb([20, 20, 20]));
            }
        }
        y += 14;
    }
    page
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// SSIM over a full page pair that differs on every text line.
fn bench_ssim(c: &mut Criterion) {
    let reference = synthetic_page(0);
    let candidate = synthetic_page(3);
    let scorer = SsimScorer::default();

    c.bench_function("ssim (612x792)", |b| {
        b.iter(|| {
            let score = scorer.score(black_box(&reference), black_box(&candidate));
            black_box(score.ok());
        });
    });
}

/// Mask, bounding box, and overlay composite for the same pair.
fn bench_highlight(c: &mut Criterion) {
    let reference = synthetic_page(0);
    let candidate = synthetic_page(3);
    let highlighter = Highlighter::new(HighlightOptions::default());

    c.bench_function("highlight (612x792)", |b| {
        b.iter(|| {
            let highlight = highlighter.highlight(black_box(&reference), black_box(&candidate));
            black_box(highlight.ok());
        });
    });
}

/// Lanczos resampling of a 150-dpi candidate onto a 72-dpi reference.
fn bench_normalize(c: &mut Criterion) {
    let reference = synthetic_page(0);
    let candidate = image::imageops::resize(
        &synthetic_page(0),
        1275,
        1650,
        image::imageops::FilterType::Triangle,
    );

    c.bench_function("normalize (1275x1650 -> 612x792)", |b| {
        b.iter(|| {
            let pair = normalize(black_box(&reference), black_box(&candidate));
            black_box(pair.dimensions());
        });
    });
}

criterion_group!(benches, bench_ssim, bench_highlight, bench_normalize);
criterion_main!(benches);
