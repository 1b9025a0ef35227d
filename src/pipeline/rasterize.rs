//! Stage 2: rasterise page PDFs into OCR-ready TIFFs with ImageMagick.

use super::{list_files, run_stage, StageRecord};
use crate::args::Platform;
use crate::command::Input;
use crate::error::Pdf2TxtError;
use crate::progress::{PipelineProgressCallback, PipelineStage};
use crate::runner::ProcessRunner;
use crate::tools::magick::{Magick, MagickArgs, RasterSettings};
use std::path::{Path, PathBuf};
use tracing::info;

pub const TIFF_PREFIX: &str = "page_";

/// Convert every page in `pages` into `work_dir/page_NNNN.tiff` in one
/// `magick` call. ImageMagick numbers scenes from zero.
pub fn rasterize_pages(
    pages: &[PathBuf],
    work_dir: &Path,
    settings: &RasterSettings,
    platform: Platform,
    runner: &dyn ProcessRunner,
    progress: &dyn PipelineProgressCallback,
) -> Result<(Vec<PathBuf>, StageRecord), Pdf2TxtError> {
    let pattern = work_dir.join(format!("{TIFF_PREFIX}%04d.tiff"));
    let magick = Magick::new(
        MagickArgs::new()
            .input(Input::from(pages))
            .output(pattern.to_string_lossy().into_owned())
            .operators(settings.operators())
            .platform(platform),
    )?;

    let record = run_stage(PipelineStage::Rasterize, &magick, runner, progress)?;

    let tiffs = list_files(work_dir, TIFF_PREFIX, "tiff")?;
    if tiffs.len() != pages.len() {
        return Err(Pdf2TxtError::Internal(format!(
            "expected {} TIFFs in {}, found {}",
            pages.len(),
            work_dir.display(),
            tiffs.len()
        )));
    }
    info!("Rasterised {} pages at {} DPI", tiffs.len(), settings.density);
    Ok((tiffs, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;
    use crate::runner::testing::RecordingRunner;

    #[test]
    fn one_magick_call_for_all_pages() {
        let work = tempfile::tempdir().unwrap();
        let pages: Vec<PathBuf> = (1..=2).map(|n| work.path().join(format!("page_{n:04}.pdf"))).collect();
        let work_path = work.path().to_path_buf();
        let runner = RecordingRunner::with_hook(move |_| {
            for n in 0..2 {
                std::fs::write(work_path.join(format!("page_{n:04}.tiff")), b"II*").unwrap();
            }
            0
        });

        let (tiffs, record) = rasterize_pages(
            &pages,
            work.path(),
            &RasterSettings::default(),
            Platform::Posix,
            &runner,
            &NoopProgressCallback,
        )
        .unwrap();

        assert_eq!(tiffs.len(), 2);
        assert_eq!(runner.calls().len(), 1);
        let cmd = &record.command;
        assert_eq!(cmd[0], "magick");
        assert_eq!(&cmd[1..3], ["-density", "300"]);
        assert_eq!(cmd[3], pages[0].to_string_lossy());
        assert_eq!(cmd[4], pages[1].to_string_lossy());
        assert!(cmd.last().unwrap().ends_with("page_%04d.tiff"));
    }

    #[test]
    fn missing_tiffs_are_reported() {
        let work = tempfile::tempdir().unwrap();
        let pages = vec![work.path().join("page_0001.pdf")];
        let runner = RecordingRunner::succeeding();
        let err = rasterize_pages(
            &pages,
            work.path(),
            &RasterSettings::default(),
            Platform::Posix,
            &runner,
            &NoopProgressCallback,
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected 1 TIFFs"));
    }

    #[test]
    fn magick_failure_is_execution_failed() {
        let work = tempfile::tempdir().unwrap();
        let pages = vec![work.path().join("page_0001.pdf")];
        let runner = RecordingRunner::with_hook(|_| 1);
        let err = rasterize_pages(
            &pages,
            work.path(),
            &RasterSettings::default(),
            Platform::Posix,
            &runner,
            &NoopProgressCallback,
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2TxtError::ExecutionFailed { ref program, .. } if program == "magick"));
    }
}
