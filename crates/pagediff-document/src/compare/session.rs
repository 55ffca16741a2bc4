// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Comparison session — one complete run: open both documents, reconcile them
// into a fresh run directory, and persist the result record.

use std::path::{Path, PathBuf};

use chrono::Utc;
use pagediff_core::error::PageDiffError;
use pagediff_core::{ComparisonResult, DiffConfig, RunId};
use tracing::{info, instrument};

use crate::compare::reconcile::PageSetReconciler;
use crate::compare::report::{RunContext, build_result};
use crate::compare::sink::{ArtifactSink, DirectorySink};
use crate::pdf::{PageSource, PdfDocument, Rasterizer};

/// Compare two PDF files on disk.
///
/// The configuration is validated before either document is opened, so a
/// bad threshold never touches the filesystem. Document handles are released
/// when this function returns, on success and on failure alike.
#[instrument(skip(config), fields(pdf1 = %pdf1.as_ref().display(), pdf2 = %pdf2.as_ref().display()))]
pub fn compare_files(
    pdf1: impl AsRef<Path>,
    pdf2: impl AsRef<Path>,
    config: &DiffConfig,
) -> Result<ComparisonResult, PageDiffError> {
    config.validate()?;
    let rasterizer = Rasterizer::new(config.rasterizer_program.clone());
    let first = PdfDocument::open(pdf1, rasterizer.clone())?;
    let second = PdfDocument::open(pdf2, rasterizer)?;
    compare_sources(&first, &second, config)
}

/// Compare two already-open page sources.
///
/// Every run writes into its own timestamped directory below
/// `config.output_dir`; the record is written last, so a run that fails
/// part-way leaves no record behind.
pub fn compare_sources(
    first: &dyn PageSource,
    second: &dyn PageSource,
    config: &DiffConfig,
) -> Result<ComparisonResult, PageDiffError> {
    let reconciler = PageSetReconciler::new(config)?;

    let run_id = RunId::new();
    let started_at = Utc::now();
    let run_dir = config.output_dir.join(run_id.directory_name(started_at));
    let mut sink = DirectorySink::create(&run_dir)?;
    info!(run = %run_id, dir = %sink.location().display(), "Run started");

    let reconciliation = reconciler.reconcile(first, second, &mut sink)?;

    let context = RunContext {
        run_id,
        generated_at: Utc::now(),
        pdf1: absolute(first.path())?,
        pdf2: absolute(second.path())?,
        threshold: reconciler.threshold(),
        output_dir: sink.location().to_path_buf(),
    };
    let result = build_result(reconciliation, context);
    let record = sink.write_record(&result)?;

    info!(
        identical = result.identical,
        record = %record.display(),
        "Run finished"
    );
    Ok(result)
}

fn absolute(path: &Path) -> Result<PathBuf, PageDiffError> {
    Ok(std::path::absolute(path)?)
}
