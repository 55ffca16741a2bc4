// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Comparison pipeline: page-set reconciliation, result reporting, artifact
// output, and the session that ties them into one run.

pub mod reconcile;
pub mod report;
pub mod session;
pub mod sink;

pub use reconcile::{PageSetReconciler, Reconciliation, is_difference};
pub use report::{IDENTICAL_DESCRIPTION, RunContext, build_result, describe, render_summary};
pub use session::{compare_files, compare_sources};
pub use sink::{ArtifactSink, DirectorySink, RECORD_FILE};
