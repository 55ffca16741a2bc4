// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line.
//
// Every fatal error is mapped to a one-line summary with a concrete
// suggestion. Severity tells the caller whether the user or the environment
// has to change before a rerun can succeed.

use crate::error::PageDiffError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The invocation itself is wrong (bad threshold, missing file).
    ActionRequired,
    /// Something in the environment is missing or broken (renderer, disk).
    Environment,
    /// The input document cannot be processed as it is.
    Permanent,
}

/// A human-readable error with a plain summary and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `PageDiffError` into a `HumanError`.
pub fn humanize_error(err: &PageDiffError) -> HumanError {
    match err {
        PageDiffError::InvalidConfig(detail) => HumanError {
            message: "The comparison settings are not valid.".into(),
            suggestion: format!("Fix the option and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PageDiffError::PdfError(detail) => HumanError {
            message: "One of the PDF files could not be opened.".into(),
            suggestion: format!(
                "Check that both paths point to readable, undamaged PDF files. ({detail})"
            ),
            severity: Severity::Permanent,
        },

        PageDiffError::Rasterization { page, detail } => humanize_render_error(*page, detail),

        PageDiffError::ImageError(detail) => HumanError {
            message: "A page image could not be processed.".into(),
            suggestion: format!("The renderer may have produced unexpected output. ({detail})"),
            severity: Severity::Environment,
        },

        PageDiffError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file or directory could not be found.".into(),
                suggestion: "Check the input paths and the output directory.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied while writing results.".into(),
                suggestion: "Choose an output directory you can write to with --output.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading or writing a file failed.".into(),
                suggestion: format!("Check free disk space and try again. ({io_err})"),
                severity: Severity::Environment,
            },
        },

        PageDiffError::Serialization(_) => HumanError {
            message: "The result record could not be encoded.".into(),
            suggestion: "Please report this together with the two input files.".into(),
            severity: Severity::Permanent,
        },
    }
}

fn humanize_render_error(page: usize, detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    // Only a failed spawn means the renderer itself is missing; pdftoppm
    // reports unreadable inputs with its own "No such file" message.
    if lower.starts_with("failed to invoke") {
        HumanError {
            message: "The PDF renderer is not available.".into(),
            suggestion: "Install poppler-utils (which provides pdftoppm) or point rasterizer_program at it."
                .into(),
            severity: Severity::Environment,
        }
    } else if lower.contains("out of range") {
        HumanError {
            message: format!("Page {page} does not exist."),
            suggestion: "The document may have changed while it was being compared.".into(),
            severity: Severity::Permanent,
        }
    } else {
        HumanError {
            message: format!("Page {page} could not be rendered."),
            suggestion: format!("The page may be damaged. ({detail})"),
            severity: Severity::Permanent,
        }
    }
}
