//! Error types for the edgequake-pdf2txt library.
//!
//! Failures fall into four groups, and callers usually treat each one
//! differently:
//!
//! * [`ValidationFailure`] — caller data broke a tool's argument grammar
//!   (missing input file, unknown operation, empty password). Always raised
//!   before any subprocess is spawned. Wrapped as [`Pdf2TxtError::Validation`].
//!
//! * [`Pdf2TxtError::InvalidConfig`] — the caller passed a value that can never
//!   be right, whatever the filesystem says (an encryption level other than
//!   40 or 128, a pipeline depth of 12). A programming error, not bad input.
//!
//! * [`Pdf2TxtError::SpawnFailed`] — the runner could not start the binary.
//!   A tool that starts and exits non-zero is *not* an error at this layer.
//!
//! * [`Pdf2TxtError::ExecutionFailed`] — raised by the pipeline when a tool
//!   it depends on returned a non-zero exit code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2txt library.
#[derive(Debug, Error)]
pub enum Pdf2TxtError {
    // ── Argument errors ───────────────────────────────────────────────────
    /// An assigned value failed a binding's grammar rule.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A value is structurally invalid regardless of runtime state.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A value's shape matched none of the formatter's rules.
    #[error("Unsupported argument shape ({shape}): {value}")]
    ArgumentShape { shape: String, value: String },

    // ── Process errors ────────────────────────────────────────────────────
    /// The binary could not be launched at all.
    #[error("Failed to launch '{program}': {source}\nIs it installed and on PATH?")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline stage's tool exited unsuccessfully.
    #[error("{program} failed (exit code {}): {stderr}", display_code(.exit_code))]
    ExecutionFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading or writing a pipeline file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2TxtError {
    /// The validation failure, if this error is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Pdf2TxtError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "killed by signal".to_string(), |c| c.to_string())
}

/// The attribute category whose validator rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgCategory {
    Input,
    Output,
    Operator,
    Option,
}

impl fmt::Display for ArgCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgCategory::Input => "input",
            ArgCategory::Output => "output",
            ArgCategory::Operator => "operator",
            ArgCategory::Option => "option",
        };
        f.write_str(name)
    }
}

/// A caller-data error detected before execution.
///
/// Carries enough to pinpoint the rejected argument: which category rejected
/// it and the offending value as it would have appeared on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Invalid {category} value: {value}\n{reason}")]
pub struct ValidationFailure {
    pub category: ArgCategory,
    pub value: String,
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(category: ArgCategory, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_display_names_category_and_value() {
        let e = ValidationFailure::new(ArgCategory::Input, "missing.pdf", "file does not exist");
        let msg = e.to_string();
        assert!(msg.contains("input"), "got: {msg}");
        assert!(msg.contains("missing.pdf"), "got: {msg}");
    }

    #[test]
    fn validation_is_transparent_through_library_error() {
        let inner = ValidationFailure::new(ArgCategory::Output, "report.txt", "not a .pdf");
        let e = Pdf2TxtError::from(inner.clone());
        assert_eq!(e.to_string(), inner.to_string());
        assert_eq!(e.as_validation(), Some(&inner));
    }

    #[test]
    fn execution_failed_display_with_code() {
        let e = Pdf2TxtError::ExecutionFailed {
            program: "pdftk".into(),
            exit_code: Some(3),
            stderr: "Error: Unable to find file.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pdftk"));
        assert!(msg.contains("exit code 3"), "got: {msg}");
    }

    #[test]
    fn execution_failed_display_without_code() {
        let e = Pdf2TxtError::ExecutionFailed {
            program: "magick".into(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(e.to_string().contains("killed by signal"));
    }

    #[test]
    fn config_error_is_not_a_validation_failure() {
        let e = Pdf2TxtError::InvalidConfig("encrypt must be 40 or 128".into());
        assert!(e.as_validation().is_none());
    }
}
