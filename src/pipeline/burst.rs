//! Stage 1: split the source PDF into one file per page with pdftk.

use super::{list_files, run_stage, StageRecord};
use crate::args::{ArgValue, Platform};
use crate::error::Pdf2TxtError;
use crate::progress::{PipelineProgressCallback, PipelineStage};
use crate::runner::ProcessRunner;
use crate::tools::pdftk::{PdfArgs, PdfOperation, PdfTk};
use std::path::{Path, PathBuf};
use tracing::info;

pub const PAGE_PREFIX: &str = "page_";

/// Burst `pdf` into `work_dir/page_NNNN.pdf`.
///
/// Returns the page files in page order.
pub fn burst_pages(
    pdf: &Path,
    work_dir: &Path,
    platform: Platform,
    runner: &dyn ProcessRunner,
    progress: &dyn PipelineProgressCallback,
) -> Result<(Vec<PathBuf>, StageRecord), Pdf2TxtError> {
    let pattern = work_dir.join(format!("{PAGE_PREFIX}%04d.pdf"));
    let pdftk = PdfTk::for_operation(
        PdfOperation::Burst,
        PdfArgs::new()
            .input(pdf)
            .output(pattern.to_string_lossy().into_owned())
            .platform(platform),
        ArgValue::Absent,
    )?;

    let record = run_stage(PipelineStage::Burst, &pdftk, runner, progress)?;

    let pages = list_files(work_dir, PAGE_PREFIX, "pdf")?;
    if pages.is_empty() {
        return Err(Pdf2TxtError::Internal(format!(
            "pdftk reported success but wrote no pages to {}",
            work_dir.display()
        )));
    }
    info!("Burst {} into {} pages", pdf.display(), pages.len());
    Ok((pages, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;
    use crate::runner::testing::RecordingRunner;

    fn source_pdf(dir: &Path) -> PathBuf {
        let pdf = dir.join("source.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();
        pdf
    }

    #[test]
    fn bursts_and_lists_pages() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let pdf = source_pdf(src.path());
        let work_path = work.path().to_path_buf();
        let runner = RecordingRunner::with_hook(move |_| {
            for n in 1..=3 {
                std::fs::write(work_path.join(format!("page_{n:04}.pdf")), b"%PDF").unwrap();
            }
            std::fs::write(work_path.join("doc_data.txt"), b"NumberOfPages: 3").unwrap();
            0
        });

        let (pages, record) =
            burst_pages(&pdf, work.path(), Platform::Posix, &runner, &NoopProgressCallback).unwrap();

        assert_eq!(pages.len(), 3);
        assert!(pages[0].ends_with("page_0001.pdf"));
        let pattern = work.path().join("page_%04d.pdf").to_string_lossy().into_owned();
        assert_eq!(
            record.command,
            vec![
                "pdftk".to_string(),
                pdf.to_string_lossy().into_owned(),
                "burst".to_string(),
                "output".to_string(),
                pattern,
            ]
        );
    }

    #[test]
    fn success_without_pages_is_an_error() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let pdf = source_pdf(src.path());
        let runner = RecordingRunner::succeeding();
        let err = burst_pages(&pdf, work.path(), Platform::Posix, &runner, &NoopProgressCallback)
            .unwrap_err();
        assert!(matches!(err, Pdf2TxtError::Internal(_)));
    }

    #[test]
    fn missing_source_fails_before_spawning() {
        let work = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::succeeding();
        let err = burst_pages(
            &work.path().join("absent.pdf"),
            work.path(),
            Platform::Posix,
            &runner,
            &NoopProgressCallback,
        )
        .unwrap_err();
        assert!(err.as_validation().is_some());
        assert!(runner.calls().is_empty());
    }
}
