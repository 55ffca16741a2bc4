// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-set reconciler — walks two documents page by page, scores each pair,
// highlights pairs that fall below the similarity threshold, and exports the
// surplus pages of the longer document.

use pagediff_core::error::PageDiffError;
use pagediff_core::{DiffConfig, DocumentSide, PageComparison};
use tracing::{debug, info, instrument, warn};

use crate::compare::sink::{ArtifactSink, diff_artifact_name, extra_artifact_name};
use crate::image::{Highlighter, HighlightOptions, SsimScorer, normalize};
use crate::pdf::PageSource;

/// A page differs only when its score is strictly below the threshold; a
/// score equal to the threshold passes.
pub fn is_difference(similarity: f64, threshold: f64) -> bool {
    similarity < threshold
}

/// Raw findings of one reconciliation, before any reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub first_pages: usize,
    pub second_pages: usize,
    /// 1-based pages of the comparable prefix scoring below the threshold.
    pub diff_pages: Vec<usize>,
    /// 1-based pages beyond the comparable prefix.
    pub extra_pages: Vec<usize>,
    /// Owner of `extra_pages`; `None` when the counts match.
    pub extra_pages_source: Option<DocumentSide>,
    pub warnings: Vec<String>,
    /// One entry per page of the comparable prefix, in order.
    pub pages: Vec<PageComparison>,
}

impl Reconciliation {
    pub fn identical(&self) -> bool {
        self.diff_pages.is_empty() && self.extra_pages.is_empty()
    }

    /// Length of the prefix compared page by page.
    pub fn comparable_pages(&self) -> usize {
        self.first_pages.min(self.second_pages)
    }
}

/// Drives the page-by-page comparison of two documents.
#[derive(Debug, Clone)]
pub struct PageSetReconciler {
    threshold: f64,
    scale: f32,
    scorer: SsimScorer,
    highlighter: Highlighter,
}

impl PageSetReconciler {
    /// Build a reconciler from a validated configuration.
    pub fn new(config: &DiffConfig) -> Result<Self, PageDiffError> {
        config.validate()?;
        Ok(Self {
            threshold: config.similarity_threshold,
            scale: config.scale,
            scorer: SsimScorer::default(),
            highlighter: Highlighter::new(HighlightOptions::from(config)),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare `first` (reference) against `second` (candidate).
    ///
    /// Pages are processed strictly in order and each page's artifacts are
    /// written before the next page is rendered. The first rendering or
    /// writing failure aborts the whole reconciliation.
    #[instrument(skip_all, fields(
        first = %first.path().display(),
        second = %second.path().display(),
        threshold = self.threshold,
        scale = self.scale
    ))]
    pub fn reconcile(
        &self,
        first: &dyn PageSource,
        second: &dyn PageSource,
        sink: &mut dyn ArtifactSink,
    ) -> Result<Reconciliation, PageDiffError> {
        let first_pages = first.page_count();
        let second_pages = second.page_count();
        let comparable = first_pages.min(second_pages);

        let mut warnings = Vec::new();
        if first_pages != second_pages {
            let message = format!(
                "PDFs have different page counts. PDF1: {} pages, PDF2: {} pages.",
                first_pages, second_pages
            );
            warn!(first_pages, second_pages, "{}", message);
            warnings.push(message);
        }

        info!(comparable, "Comparing pages");
        let mut diff_pages = Vec::new();
        let mut pages = Vec::with_capacity(comparable);
        for index in 0..comparable {
            let entry = self.compare_page(first, second, index, sink)?;
            if entry.differs {
                diff_pages.push(entry.page);
            }
            pages.push(entry);
        }

        // Whichever document is longer supplies the surplus; on equal counts
        // the range is empty.
        let (longer, side) = if first_pages >= second_pages {
            (first, DocumentSide::First)
        } else {
            (second, DocumentSide::Second)
        };
        let mut extra_pages = Vec::new();
        for index in comparable..longer.page_count() {
            let page = index + 1;
            let bitmap = longer.rasterize(index, self.scale)?;
            sink.write_image(&extra_artifact_name(page, side), &bitmap)?;
            debug!(page, source = side.tag(), "Extra page exported");
            extra_pages.push(page);
        }
        let extra_pages_source = (!extra_pages.is_empty()).then_some(side);

        info!(
            diff_pages = diff_pages.len(),
            extra_pages = extra_pages.len(),
            "Reconciliation complete"
        );

        Ok(Reconciliation {
            first_pages,
            second_pages,
            diff_pages,
            extra_pages,
            extra_pages_source,
            warnings,
            pages,
        })
    }

    /// Score one page pair and, when it differs, write its highlight.
    fn compare_page(
        &self,
        first: &dyn PageSource,
        second: &dyn PageSource,
        index: usize,
        sink: &mut dyn ArtifactSink,
    ) -> Result<PageComparison, PageDiffError> {
        let page = index + 1;
        let reference = first.rasterize(index, self.scale)?;
        let candidate = second.rasterize(index, self.scale)?;

        let pair = normalize(&reference, &candidate);
        let similarity = self.scorer.score(pair.reference, &pair.candidate)?;
        let differs = is_difference(similarity, self.threshold);
        debug!(page, similarity, differs, resampled = pair.resampled(), "Page scored");

        let mut entry = PageComparison {
            page,
            similarity,
            differs,
            changed_pixels: 0,
            region: None,
            artifact: None,
        };

        if differs {
            if let Some(highlight) = self.highlighter.highlight(pair.reference, &pair.candidate)? {
                let name = diff_artifact_name(page);
                sink.write_image(&name, &highlight.image)?;
                entry.changed_pixels = highlight.changed_pixels;
                entry.region = Some(highlight.region);
                entry.artifact = Some(name);
            } else {
                debug!(page, "Below threshold but no pixel exceeds the pixel threshold");
            }
        }

        Ok(entry)
    }
}
