//! Streaming video downloads
//!
//! Bodies are copied to disk in 8 KiB chunks while cumulative progress is
//! reported to the caller. A download is skipped when a file of exactly the
//! announced size already exists at the destination. That check looks at the
//! size only: a file that changed upstream without changing length is not
//! fetched again.

use crate::fetcher::{FetchError, SiteClient};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

/// Chunk size used when copying a response body to disk
const CHUNK_SIZE: usize = 8 * 1024;

/// Errors that can occur during a download
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request failed or returned a non-success status
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading the response body failed midway
    #[error("Failed to read response body from {url}: {source}")]
    ReadFailed { url: String, source: io::Error },

    /// The destination file could not be created or written
    #[error("Failed to write file {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
}

/// What [`download_file`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A file of the announced size was already present
    Skipped,
    /// The body was written to disk
    Downloaded { bytes: u64 },
}

/// Cumulative transfer progress of one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// Label identifying the transfer, usually the destination filename.
    /// Shared by every report of one transfer.
    pub label: Rc<str>,
    /// Bytes written so far
    pub written: u64,
    /// Size announced by the server, if any
    pub total: Option<u64>,
}

/// Downloads `url` to `destination` unless a complete copy is already there.
///
/// Without a `Content-Length` the skip-check is disabled and the body is always
/// fetched. On failure a partially written file is left in place.
///
/// # Arguments
///
/// * `client` - Site client used to open the request
/// * `url` - Absolute URL or path relative to the site origin
/// * `destination` - File to write
/// * `label` - Passed through to progress reports
/// * `on_progress` - Called after every chunk written to disk
pub fn download_file<F>(
    client: &SiteClient,
    url: &str,
    destination: &Path,
    label: &str,
    mut on_progress: F,
) -> Result<DownloadOutcome, DownloadError>
where
    F: FnMut(TransferProgress),
{
    let mut body = client.open(url)?;
    let total = body.content_length;

    if let Some(expected) = total {
        if existing_size(destination) == Some(expected) {
            info!(path = %destination.display(), bytes = expected, "already downloaded, skipping");
            return Ok(DownloadOutcome::Skipped);
        }
    }

    let write_failed = |e: io::Error| DownloadError::WriteFailed {
        path: destination.to_path_buf(),
        source: e,
    };
    let mut file = File::create(destination).map_err(write_failed)?;

    let label: Rc<str> = Rc::from(label);
    let mut written: u64 = 0;
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match body.reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(DownloadError::ReadFailed {
                    url: url.to_string(),
                    source: e,
                });
            }
        };

        file.write_all(&buffer[..bytes_read]).map_err(write_failed)?;
        written += bytes_read as u64;

        on_progress(TransferProgress {
            label: Rc::clone(&label),
            written,
            total,
        });
    }

    file.flush().map_err(write_failed)?;
    debug!(path = %destination.display(), bytes = written, "download finished");

    Ok(DownloadOutcome::Downloaded { bytes: written })
}

fn existing_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}
