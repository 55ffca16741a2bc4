// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact sink — where highlight images, extra-page images, and the result
// record end up.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use pagediff_core::error::PageDiffError;
use pagediff_core::{ComparisonResult, DocumentSide};
use tracing::{debug, instrument};

use crate::image::Bitmap;

/// File name of the persisted result record.
pub const RECORD_FILE: &str = "comparison_result.json";

/// Name of the highlight image for a differing page (1-based).
pub fn diff_artifact_name(page: usize) -> String {
    format!("diff_page_{page}.png")
}

/// Name of the verbatim image of a page that exists in only one document.
pub fn extra_artifact_name(page: usize, side: DocumentSide) -> String {
    format!("extra_page_{page}_{}.png", side.tag())
}

/// Destination for everything a run produces. Writes are never retried.
pub trait ArtifactSink {
    /// Directory (or other location) the artifacts go to.
    fn location(&self) -> &Path;

    /// Store `image` as PNG under `name`; returns where it went.
    fn write_image(&mut self, name: &str, image: &Bitmap) -> Result<PathBuf, PageDiffError>;

    /// Persist the run's result record.
    fn write_record(&mut self, record: &ComparisonResult) -> Result<PathBuf, PageDiffError>;
}

/// Writes artifacts into one directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create `dir` (and any missing parents) and resolve it to an absolute
    /// path.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, PageDiffError> {
        fs::create_dir_all(dir.as_ref())?;
        let dir = fs::canonicalize(dir.as_ref())?;
        debug!("Output directory ready");
        Ok(Self { dir })
    }
}

impl ArtifactSink for DirectorySink {
    fn location(&self) -> &Path {
        &self.dir
    }

    fn write_image(&mut self, name: &str, image: &Bitmap) -> Result<PathBuf, PageDiffError> {
        let path = self.dir.join(name);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|err| match err {
                image::ImageError::IoError(io) => PageDiffError::Io(io),
                other => PageDiffError::ImageError(format!(
                    "failed to save image to {}: {}",
                    path.display(),
                    other
                )),
            })?;
        debug!(path = %path.display(), "Artifact written");
        Ok(path)
    }

    fn write_record(&mut self, record: &ComparisonResult) -> Result<PathBuf, PageDiffError> {
        let path = self.dir.join(RECORD_FILE);
        let data = serde_json::to_string_pretty(record)?;
        fs::write(&path, data)?;
        debug!(path = %path.display(), "Result record written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn artifact_names_use_one_based_pages() {
        assert_eq!(diff_artifact_name(1), "diff_page_1.png");
        assert_eq!(
            extra_artifact_name(3, DocumentSide::Second),
            "extra_page_3_pdf2.png"
        );
    }

    #[test]
    fn create_makes_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::create(root.path().join("a/b/c")).unwrap();
        assert!(sink.location().is_dir());
        assert!(sink.location().is_absolute());
    }

    #[test]
    fn write_image_round_trips_png() {
        let root = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(root.path()).unwrap();
        let bitmap = Bitmap::from_pixel(3, 2, Rgb([9, 8, 7]));

        let path = sink.write_image("diff_page_1.png", &bitmap).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded, bitmap);
    }

    #[test]
    fn unwritable_location_is_an_io_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        // A regular file where a directory is expected.
        let err = DirectorySink::create(blocker.join("sub")).unwrap_err();
        assert!(matches!(err, PageDiffError::Io(_)));
    }
}
