use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("download failed with status {0}")]
    HttpStatus(u16),
    #[error("download timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DownloadError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| DownloadError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(DownloadError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| DownloadError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| DownloadError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Streams a finished result into `{dir}/{filename}`, writing a temp file
/// first and renaming so a torn download never lands under the final name.
/// The filename is the URL's last path segment.
pub async fn download_result(
    url: &str,
    dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, DownloadError> {
    ensure_output_dir(dir)?;

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DownloadError::Network(e.to_string()))?;
    let response = client.get(url).send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus(status.as_u16()));
    }

    let filename = response
        .url()
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("result.bin")
        .to_string();

    let mut tmp = NamedTempFile::new_in(dir)?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        tmp.write_all(&chunk)?;
    }
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    let target = dir.join(&filename);
    // Replace an existing file so re-running a batch stays deterministic.
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|e| DownloadError::Io(e.error))?;
    Ok(target)
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::Timeout;
    }
    DownloadError::Network(err.to_string())
}
