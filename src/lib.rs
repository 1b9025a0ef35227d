//! # edgequake-pdf2txt
//!
//! Validated command builders for `pdftk`, ImageMagick's `magick` and
//! `tesseract`, and an OCR pipeline that chains them to turn a scanned PDF
//! into text.
//!
//! ## Command builders
//!
//! Each tool binding is built once from a [`CommandArgs`], converting
//! semantic parameters (input files, named operators, boolean options) into
//! ordered token groups. Validation runs before anything is spawned; an
//! empty binding runs the tool's version check instead.
//!
//! ```rust
//! use edgequake_pdf2txt::{CommandSpec, PdfArgs, PdfTk, Permission};
//!
//! let pdftk = PdfTk::new(
//!     PdfArgs::new()
//!         .input("PROMPT")
//!         .output("secured.pdf")
//!         .operator("owner_pw", "hunter2")
//!         .operator("allow", vec![Permission::Printing])
//!         .option("encrypt", 128),
//! )
//! .unwrap();
//! assert_eq!(
//!     pdftk.command_line().unwrap(),
//!     [
//!         "pdftk", "PROMPT", "output", "secured.pdf", "encrypt_128bit",
//!         "allow", "Printing", "owner_pw", "hunter2", "dont_ask",
//!     ]
//! );
//! ```
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Burst      pdftk <pdf> burst output page_%04d.pdf
//!  ├─ 3. Rasterize  magick -density 300 <pages> -type Grayscale ... page_%04d.tiff
//!  └─ 4. OCR        tesseract pages.txt <output> -l eng txt
//! ```
//!
//! ```rust,no_run
//! use edgequake_pdf2txt::{convert, PipelineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = convert("scan.pdf", "scan", &PipelineConfig::default())?;
//!     eprintln!("{} pages → {}", report.page_count, report.output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2txt = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod args;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod tools;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use args::{ArgMap, ArgValue, Platform};
pub use command::{CommandArgs, CommandSpec, Input};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use convert::{check_tools, convert, convert_with_runner, PipelineReport, ToolStatus};
pub use error::{ArgCategory, Pdf2TxtError, ValidationFailure};
pub use pipeline::{ensure_success, StageRecord};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, PipelineStage, ProgressCallback};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
pub use tools::magick::{ImageOperator, Magick, MagickArgs, RasterSettings, SettingPosition};
pub use tools::pdftk::{PdfArgs, PdfOperation, PdfTk, Permission};
pub use tools::tesseract::{OutputFormat, Tesseract, TesseractArgs};
