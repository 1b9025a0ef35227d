//! Stage 3: OCR every TIFF in a single tesseract run driven by a list file.

use super::{run_stage, StageRecord};
use crate::args::Platform;
use crate::error::Pdf2TxtError;
use crate::progress::{PipelineProgressCallback, PipelineStage};
use crate::runner::ProcessRunner;
use crate::tools::tesseract::{OutputFormat, Tesseract, TesseractArgs};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LIST_FILE: &str = "pages.txt";

/// Write one image path per line, in the given order.
pub fn write_list_file(images: &[PathBuf], list_file: &Path) -> Result<(), Pdf2TxtError> {
    let io_err = |source: std::io::Error| Pdf2TxtError::Io {
        path: list_file.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(list_file).map_err(io_err)?;
    for image in images {
        writeln!(file, "{}", image.display()).map_err(io_err)?;
    }
    file.flush().map_err(io_err)?;
    debug!("Wrote {} entries to {}", images.len(), list_file.display());
    Ok(())
}

/// Path tesseract writes for `output_base` in `format`.
pub fn output_path(output_base: &Path, format: OutputFormat) -> PathBuf {
    let mut name = output_base.as_os_str().to_os_string();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Recognise `images` into `output_base.<ext>`.
#[allow(clippy::too_many_arguments)]
pub fn recognize_pages(
    images: &[PathBuf],
    work_dir: &Path,
    output_base: &Path,
    language: &str,
    format: OutputFormat,
    platform: Platform,
    runner: &dyn ProcessRunner,
    progress: &dyn PipelineProgressCallback,
) -> Result<(PathBuf, StageRecord), Pdf2TxtError> {
    let list_file = work_dir.join(LIST_FILE);
    write_list_file(images, &list_file)?;

    let tesseract = Tesseract::new(
        TesseractArgs::new()
            .input(list_file.as_path())
            .output(output_base.to_string_lossy().into_owned())
            .operator("l", language)
            .options(format.config_name().into())
            .platform(platform),
    )?;

    let record = run_stage(PipelineStage::Recognize, &tesseract, runner, progress)?;

    let output = output_path(output_base, format);
    info!("OCR output written to {}", output.display());
    Ok((output, record))
}
