// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result reporter — turns a reconciliation into the immutable result record
// and its human-readable rendering. Scores are taken as given.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use pagediff_core::{ComparisonResult, DocumentSide, RunId, RunStatus};

use crate::compare::reconcile::Reconciliation;

/// Description used when nothing differs.
pub const IDENTICAL_DESCRIPTION: &str = "All pages are visually identical.";

/// Identity of the run a record belongs to.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    /// Absolute path of the reference document.
    pub pdf1: PathBuf,
    /// Absolute path of the candidate document.
    pub pdf2: PathBuf,
    pub threshold: f64,
    pub output_dir: PathBuf,
}

/// Compose the description from the diff clause and the extra-page clause,
/// in that order.
pub fn describe(
    diff_pages: &[usize],
    extra_pages: &[usize],
    extra_source: Option<DocumentSide>,
) -> String {
    let mut clauses = Vec::with_capacity(2);
    if !diff_pages.is_empty() {
        clauses.push(format!(
            "Visual differences found on pages: {}.",
            join_pages(diff_pages)
        ));
    }
    if !extra_pages.is_empty() {
        let owner = extra_source.map(|side| side.label()).unwrap_or("the longer document");
        clauses.push(format!(
            "Extra pages only in {}: {}.",
            owner,
            join_pages(extra_pages)
        ));
    }
    if clauses.is_empty() {
        IDENTICAL_DESCRIPTION.to_string()
    } else {
        clauses.join(" ")
    }
}

fn join_pages(pages: &[usize]) -> String {
    pages
        .iter()
        .map(|page| page.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the result record for a finished reconciliation.
pub fn build_result(reconciliation: Reconciliation, context: RunContext) -> ComparisonResult {
    let identical = reconciliation.identical();
    let description = describe(
        &reconciliation.diff_pages,
        &reconciliation.extra_pages,
        reconciliation.extra_pages_source,
    );

    ComparisonResult {
        run_id: context.run_id,
        generated_at: context.generated_at,
        status: if identical {
            RunStatus::Success
        } else {
            RunStatus::Error
        },
        description,
        pdf1: context.pdf1,
        pdf2: context.pdf2,
        pdf1_pages: reconciliation.first_pages,
        pdf2_pages: reconciliation.second_pages,
        threshold: context.threshold,
        identical,
        diff_pages: reconciliation.diff_pages,
        extra_pages: reconciliation.extra_pages,
        extra_pages_source: reconciliation.extra_pages_source,
        warnings: reconciliation.warnings,
        pages: reconciliation.pages,
        output_dir: context.output_dir,
    }
}

/// Human-readable summary: warnings, the description, and where the results
/// went.
pub fn render_summary(result: &ComparisonResult) -> String {
    let mut out = String::new();
    for warning in &result.warnings {
        let _ = writeln!(out, "Warning: {warning}");
    }
    if result.pdf1_pages != result.pdf2_pages {
        let _ = writeln!(out, "Comparing up to the lower page count.");
    }
    let _ = writeln!(out, "{}", result.description);
    let _ = write!(out, "Results saved to: {}", result.output_dir.display());
    out
}
