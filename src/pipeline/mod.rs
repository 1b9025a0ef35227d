//! Pipeline stages for PDF → text OCR.
//!
//! Each submodule drives exactly one tool. All intermediates live in a single
//! work directory owned by the caller.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ burst ──▶ rasterize ──▶ ocr
//! (URL/path) (pdftk)   (magick)     (tesseract)
//!            page_0001.pdf ...
//!                      page_0000.tiff ...
//!                                   pages.txt ──▶ <output>.<ext>
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local file
//! 2. [`burst`]     — one PDF per page
//! 3. [`rasterize`] — grayscale 8-bit TIFFs, one per page
//! 4. [`ocr`]       — list file of TIFFs, then a single tesseract run

pub mod burst;
pub mod input;
pub mod ocr;
pub mod rasterize;

use crate::command::CommandSpec;
use crate::error::Pdf2TxtError;
use crate::progress::{PipelineProgressCallback, PipelineStage};
use crate::runner::{ProcessOutput, ProcessRunner};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Turn a non-zero exit into [`Pdf2TxtError::ExecutionFailed`].
pub fn ensure_success(program: &str, output: &ProcessOutput) -> Result<(), Pdf2TxtError> {
    if output.success() {
        return Ok(());
    }
    Err(Pdf2TxtError::ExecutionFailed {
        program: program.to_string(),
        exit_code: output.exit_code,
        stderr: output.stderr.trim().to_string(),
    })
}

/// What one stage executed and how long it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub command: Vec<String>,
    pub elapsed_ms: u64,
}

/// Validate, run and check one tool invocation, reporting to `progress`.
pub(crate) fn run_stage(
    stage: PipelineStage,
    binding: &dyn CommandSpec,
    runner: &dyn ProcessRunner,
    progress: &dyn PipelineProgressCallback,
) -> Result<StageRecord, Pdf2TxtError> {
    let start = Instant::now();
    let result = binding
        .command_line()
        .map_err(Pdf2TxtError::from)
        .and_then(|command| {
            progress.on_stage_start(stage, &command);
            let output = runner.execute(&command)?;
            ensure_success(binding.program(), &output)?;
            Ok(command)
        });

    match result {
        Ok(command) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            info!("Stage {stage} finished in {elapsed_ms}ms");
            progress.on_stage_complete(stage, elapsed_ms);
            Ok(StageRecord {
                stage,
                command,
                elapsed_ms,
            })
        }
        Err(e) => {
            progress.on_stage_error(stage, &e.to_string());
            Err(e)
        }
    }
}

/// Files in `dir` named `<prefix>*.<extension>`, in page-number order.
///
/// The number is the digit run after `prefix`, so `page_10000` follows
/// `page_9999`. Names without one sort last, by name.
pub(crate) fn list_files(
    dir: &Path,
    prefix: &str,
    extension: &str,
) -> Result<Vec<PathBuf>, Pdf2TxtError> {
    let entries = std::fs::read_dir(dir).map_err(|source| Pdf2TxtError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Pdf2TxtError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix))
            && path.extension().and_then(|e| e.to_str()) == Some(extension);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|path| (page_number(path, prefix).unwrap_or(u64::MAX), path.clone()));
    Ok(files)
}

fn page_number(path: &Path, prefix: &str) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?.strip_prefix(prefix)?;
    let digits: String = stem.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
