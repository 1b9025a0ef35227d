//! Input resolution: normalise a user-supplied path or URL to a local PDF.
//!
//! pdftk needs a file-system path, so URLs are downloaded into a `TempDir`
//! that lives as long as the returned [`ResolvedInput`]. The `%PDF` magic is
//! checked up front so a wrong file fails here instead of deep inside pdftk.

use crate::error::Pdf2TxtError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the PDF lives in `_temp_dir` until this is dropped.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local PDF file path.
///
/// URLs are fetched with a blocking client bounded by `timeout_secs`.
pub fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Pdf2TxtError> {
    if is_url(input) {
        download_url(input, timeout_secs)
    } else if input.trim().is_empty() || input.contains("://") {
        Err(Pdf2TxtError::InvalidInput {
            input: input.to_string(),
        })
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and PDF magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, Pdf2TxtError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(Pdf2TxtError::FileNotFound { path });
    }

    let mut file = std::fs::File::open(&path).map_err(|source| Pdf2TxtError::Io {
        path: path.clone(),
        source,
    })?;
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(Pdf2TxtError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Pdf2TxtError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| Pdf2TxtError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            Pdf2TxtError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = filename_from_url(url);
    let temp_dir = TempDir::new().map_err(|source| Pdf2TxtError::Io {
        path: std::env::temp_dir(),
        source,
    })?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;

    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(Pdf2TxtError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    std::fs::write(&file_path, &bytes).map_err(|source| Pdf2TxtError::Io {
        path: file_path.clone(),
        source,
    })?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of the URL when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
