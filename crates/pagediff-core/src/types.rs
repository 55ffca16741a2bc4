// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for pagediff.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Name of the per-run output directory: the start time followed by a
    /// short suffix of the id, so two runs in the same millisecond still get
    /// distinct directories.
    pub fn directory_name(&self, started_at: DateTime<Utc>) -> String {
        let simple = self.0.simple().to_string();
        format!(
            "{}_{}",
            started_at.format("%Y%m%d-%H%M%S-%3f"),
            &simple[..8]
        )
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two compared documents something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentSide {
    /// The reference document (first argument).
    #[serde(rename = "pdf1")]
    First,
    /// The candidate document (second argument).
    #[serde(rename = "pdf2")]
    Second,
}

impl DocumentSide {
    /// Short lowercase tag used in artifact file names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::First => "pdf1",
            Self::Second => "pdf2",
        }
    }

    /// Label used in human-readable output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "PDF1",
            Self::Second => "PDF2",
        }
    }
}

/// Outcome tag of a finished run. `Error` means differences were found; a run
/// that failed outright produces no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// Smallest axis-aligned rectangle enclosing every changed pixel of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Per-page entry in the result record for every page of the comparable
/// prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageComparison {
    /// 1-based page number.
    pub page: usize,
    pub similarity: f64,
    /// `similarity < threshold`.
    pub differs: bool,
    /// Pixels with a channel difference above the pixel threshold. Only
    /// computed for differing pages.
    pub changed_pixels: u64,
    pub region: Option<BoundingBox>,
    /// File name of the highlight image, if one was written.
    pub artifact: Option<String>,
}

/// Everything a run found, as persisted to `comparison_result.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub status: RunStatus,
    pub description: String,
    /// Absolute path of the reference document.
    pub pdf1: PathBuf,
    /// Absolute path of the candidate document.
    pub pdf2: PathBuf,
    pub pdf1_pages: usize,
    pub pdf2_pages: usize,
    pub threshold: f64,
    pub identical: bool,
    /// 1-based numbers of pages whose similarity fell below the threshold.
    pub diff_pages: Vec<usize>,
    /// 1-based numbers of pages present only in the longer document.
    pub extra_pages: Vec<usize>,
    pub extra_pages_source: Option<DocumentSide>,
    pub warnings: Vec<String>,
    pub pages: Vec<PageComparison>,
    /// Directory holding this run's artifacts and record.
    pub output_dir: PathBuf,
}
