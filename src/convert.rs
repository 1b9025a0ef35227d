//! Pipeline driver and tool health checks.
//!
//! [`convert`] chains the three tool stages over a private work directory:
//!
//! ```text
//! resolve input ─▶ pdftk burst ─▶ magick → TIFF ─▶ list file ─▶ tesseract
//! ```
//!
//! The first failing stage aborts the run with its error. The work directory
//! is removed when the run ends, successful or not, unless
//! [`PipelineConfig::keep_intermediates`] is set.

use crate::args::Platform;
use crate::command::CommandSpec;
use crate::config::PipelineConfig;
use crate::error::Pdf2TxtError;
use crate::pipeline::{burst, input, ocr, rasterize, StageRecord};
use crate::progress::{NoopProgressCallback, PipelineProgressCallback};
use crate::runner::{ProcessRunner, SystemRunner};
use crate::tools::magick::Magick;
use crate::tools::pdftk::PdfTk;
use crate::tools::tesseract::{OutputFormat, Tesseract};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info};

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// The input as given (path or URL).
    pub input: String,
    /// The file tesseract produced.
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Pages burst from the document.
    pub page_count: usize,
    /// One record per tool stage, in execution order.
    pub stages: Vec<StageRecord>,
    /// Where the intermediates were left, when kept.
    pub intermediates: Option<PathBuf>,
    pub total_duration_ms: u64,
}

/// OCR a PDF file or URL into `output_base.<ext>` using the installed tools.
///
/// # Arguments
/// * `input`       — local file path or HTTP/HTTPS URL to a PDF
/// * `output_base` — output path without extension; tesseract appends it
/// * `config`      — pipeline configuration
///
/// # Errors
/// Input errors ([`Pdf2TxtError::FileNotFound`], [`Pdf2TxtError::NotAPdf`],
/// download failures), [`Pdf2TxtError::SpawnFailed`] when a tool is missing,
/// and [`Pdf2TxtError::ExecutionFailed`] when a tool exits non-zero.
pub fn convert(
    input: impl AsRef<str>,
    output_base: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineReport, Pdf2TxtError> {
    convert_with_runner(input, output_base, config, &SystemRunner)
}

/// [`convert`] with an explicit [`ProcessRunner`].
pub fn convert_with_runner(
    input: impl AsRef<str>,
    output_base: impl AsRef<Path>,
    config: &PipelineConfig,
    runner: &dyn ProcessRunner,
) -> Result<PipelineReport, Pdf2TxtError> {
    let total_start = Instant::now();
    let input_str = input.as_ref();
    let output_base = output_base.as_ref();
    let progress: &dyn PipelineProgressCallback = match &config.progress_callback {
        Some(cb) => cb.as_ref(),
        None => &NoopProgressCallback,
    };
    let platform = Platform::native();
    info!("Starting OCR pipeline: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs)?;
    let target = ocr::output_path(output_base, config.format);
    if is_same_file(resolved.path(), &target) {
        return Err(Pdf2TxtError::InvalidConfig(format!(
            "Output '{}' would overwrite the input PDF",
            target.display()
        )));
    }
    progress.on_pipeline_start(input_str);

    // ── Step 2: Work directory ───────────────────────────────────────────
    let work = create_work_dir(config.work_dir.as_deref())?;
    debug!("Intermediates in {}", work.path().display());
    if let Some(parent) = output_base.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Pdf2TxtError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // ── Step 3: Tool stages ──────────────────────────────────────────────
    let (pages, burst_record) =
        burst::burst_pages(resolved.path(), work.path(), platform, runner, progress)?;
    let (tiffs, raster_record) = rasterize::rasterize_pages(
        &pages,
        work.path(),
        &config.raster,
        platform,
        runner,
        progress,
    )?;
    let (output, ocr_record) = ocr::recognize_pages(
        &tiffs,
        work.path(),
        output_base,
        &config.language,
        config.format,
        platform,
        runner,
        progress,
    )?;

    // ── Step 4: Clean up ─────────────────────────────────────────────────
    let intermediates = if config.keep_intermediates {
        let kept = work.keep();
        info!("Keeping intermediates in {}", kept.display());
        Some(kept)
    } else {
        drop(work);
        None
    };

    let output_str = output.to_string_lossy();
    progress.on_pipeline_complete(pages.len(), &output_str);
    let total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "OCR pipeline finished: {} pages → {} in {}ms",
        pages.len(),
        output_str,
        total_duration_ms
    );

    Ok(PipelineReport {
        input: input_str.to_string(),
        output,
        format: config.format,
        page_count: pages.len(),
        stages: vec![burst_record, raster_record, ocr_record],
        intermediates,
        total_duration_ms,
    })
}

fn create_work_dir(parent: Option<&Path>) -> Result<TempDir, Pdf2TxtError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("pdf2txt-");
    let result = match parent {
        Some(dir) => builder.tempdir_in(dir),
        None => builder.tempdir(),
    };
    result.map_err(|source| Pdf2TxtError::Io {
        path: parent.map_or_else(std::env::temp_dir, Path::to_path_buf),
        source,
    })
}

// ── Health checks ────────────────────────────────────────────────────────

/// Result of one tool's health check.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub program: &'static str,
    pub command: Vec<String>,
    pub available: bool,
    /// First non-empty line the tool printed, when it ran.
    pub version: Option<String>,
    pub error: Option<String>,
}

/// Run the health check of every tool the pipeline needs.
///
/// Never fails: a missing or broken tool is reported in its [`ToolStatus`].
pub fn check_tools(runner: &dyn ProcessRunner) -> Vec<ToolStatus> {
    let (pdftk, magick, tesseract) = (PdfTk::default(), Magick::default(), Tesseract::default());
    let bindings: [&dyn CommandSpec; 3] = [&pdftk, &magick, &tesseract];
    bindings
        .into_iter()
        .map(|binding| {
            let command = binding.health_check();
            let mut status = ToolStatus {
                program: binding.program(),
                command,
                available: false,
                version: None,
                error: None,
            };
            match binding.run(runner) {
                Ok(out) if out.success() => {
                    status.available = true;
                    status.version = first_line(&out.stdout).or_else(|| first_line(&out.stderr));
                }
                Ok(out) => {
                    let code = out.exit_code.map_or_else(|| "none".to_string(), |c| c.to_string());
                    status.error = Some(format!("exit code {code}: {}", out.stderr.trim()));
                }
                Err(e) => status.error = Some(e.to_string()),
            }
            debug!("Health check {}: available={}", status.program, status.available);
            status
        })
        .collect()
}

/// Both paths name one existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
