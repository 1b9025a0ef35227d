//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe the
//! pipeline as it moves from bursting to rasterising to OCR. The CLI uses it
//! to drive a spinner.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2txt::{PipelineConfig, PipelineProgressCallback, PipelineStage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct StageCounter {
//!     finished: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for StageCounter {
//!     fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done in {elapsed_ms} ms");
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(StageCounter { finished: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The three tool stages of the OCR pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// pdftk splits the document into one PDF per page.
    Burst,
    /// ImageMagick turns page PDFs into grayscale TIFFs.
    Rasterize,
    /// Tesseract reads the TIFF list.
    Recognize,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 3] = [
        PipelineStage::Burst,
        PipelineStage::Rasterize,
        PipelineStage::Recognize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Burst => "burst",
            PipelineStage::Rasterize => "rasterize",
            PipelineStage::Recognize => "recognize",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called by the pipeline as it runs each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The trait is `Send + Sync` so a callback can be
/// shared with whatever thread renders progress.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once, after the input has been resolved to a local PDF.
    fn on_pipeline_start(&self, input: &str) {
        let _ = input;
    }

    /// Called just before a stage's tool is launched.
    ///
    /// # Arguments
    /// * `stage`   — the stage about to run
    /// * `command` — the exact token sequence that will be executed
    fn on_stage_start(&self, stage: PipelineStage, command: &[String]) {
        let _ = (stage, command);
    }

    /// Called when a stage's tool exited successfully.
    fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails; the pipeline stops afterwards.
    fn on_stage_error(&self, stage: PipelineStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the final output has been produced.
    ///
    /// # Arguments
    /// * `page_count` — number of pages that went through OCR
    /// * `output`     — path of the file tesseract wrote
    fn on_pipeline_complete(&self, page_count: usize, output: &str) {
        let _ = (page_count, output);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
