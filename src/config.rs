//! Configuration for the PDF → text OCR pipeline.
//!
//! Every pipeline knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. Individual tool invocations are configured
//! per call through [`crate::command::CommandArgs`] instead.

use crate::error::Pdf2TxtError;
use crate::progress::ProgressCallback;
use crate::tools::magick::RasterSettings;
use crate::tools::tesseract::OutputFormat;
use std::fmt;
use std::path::PathBuf;

/// Lowest and highest rasterisation density accepted, in DPI.
pub const DENSITY_RANGE: (u32, u32) = (72, 1200);

/// Configuration for a pipeline run.
///
/// # Example
/// ```rust
/// use edgequake_pdf2txt::{OutputFormat, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .density(200)
///     .language("deu+eng")
///     .format(OutputFormat::Pdf)
///     .build()
///     .unwrap();
/// assert_eq!(config.raster.depth, 8);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// ImageMagick settings for the page TIFFs.
    pub raster: RasterSettings,

    /// Tesseract language(s), `+`-joined. Default: `eng`.
    pub language: String,

    /// Tesseract output renderer. Default: [`OutputFormat::Txt`].
    pub format: OutputFormat,

    /// Keep the burst PDFs, TIFFs and list file after the run. Default: false.
    ///
    /// The directory is logged at `info` level so it can be inspected.
    pub keep_intermediates: bool,

    /// Parent directory for the intermediates directory. Default: system temp.
    pub work_dir: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional stage-event observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raster: RasterSettings::default(),
            language: "eng".to_string(),
            format: OutputFormat::default(),
            keep_intermediates: false,
            work_dir: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("raster", &self.raster)
            .field("language", &self.language)
            .field("format", &self.format)
            .field("keep_intermediates", &self.keep_intermediates)
            .field("work_dir", &self.work_dir)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn density(mut self, dpi: u32) -> Self {
        self.config.raster.density = dpi;
        self
    }

    pub fn image_type(mut self, image_type: impl Into<String>) -> Self {
        self.config.raster.image_type = image_type.into();
        self
    }

    pub fn compress(mut self, compress: impl Into<String>) -> Self {
        self.config.raster.compress = compress.into();
        self
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.config.raster.background = background.into();
        self
    }

    pub fn alpha(mut self, alpha: impl Into<String>) -> Self {
        self.config.raster.alpha = alpha.into();
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.config.raster.depth = depth;
        self
    }

    pub fn raster(mut self, raster: RasterSettings) -> Self {
        self.config.raster = raster;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.config.keep_intermediates = keep;
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Pdf2TxtError> {
        let c = &self.config;
        let (lo, hi) = DENSITY_RANGE;
        if !(lo..=hi).contains(&c.raster.density) {
            return Err(Pdf2TxtError::InvalidConfig(format!(
                "Density must be {lo}–{hi} DPI, got {}",
                c.raster.density
            )));
        }
        if c.raster.depth != 8 && c.raster.depth != 16 {
            return Err(Pdf2TxtError::InvalidConfig(format!(
                "Depth must be 8 or 16, got {}",
                c.raster.depth
            )));
        }
        if c.language.trim().is_empty() {
            return Err(Pdf2TxtError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
