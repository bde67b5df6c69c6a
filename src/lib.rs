//! Tōku Reo - archive a te reo Māori television series for a media library
//!
//! This library scrapes the series website for its seasons and episodes,
//! downloads every episode video and writes NFO metadata files next to them
//! so media servers can pick up titles, plots and air dates.

mod catalog;
mod downloader;
mod fetcher;
mod file_operations;
mod nfo;
pub mod site;

#[cfg(test)]
mod testing;

// Re-export error types
pub use catalog::{CatalogError, EpisodeDownloadError};
pub use downloader::DownloadError;
pub use fetcher::FetchError;
pub use file_operations::FileOperationError;
pub use nfo::NfoError;

// Re-export the building blocks
pub use catalog::{Episode, EpisodeDownload, Season, list_seasons};
pub use downloader::{DownloadOutcome, TransferProgress, download_file};
pub use fetcher::{HttpTransport, RemoteBody, SiteClient, Transport};
pub use file_operations::{episode_stem, extension_from_url, sanitize_filename};
pub use nfo::{EpisodeDetails, episode_nfo, tvshow_nfo};

use file_operations::{ensure_directory, write_nfo};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the series-level metadata file in the destination directory
pub const TVSHOW_NFO: &str = "tvshow.nfo";

/// Progress event emitted while archiving the series
///
/// These events allow library users to track progress and provide feedback
/// while the series is downloaded.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Archiving started
    Started { destination: PathBuf },

    /// `tvshow.nfo` written
    ShowMetadataWritten { path: PathBuf },

    /// Season links read from the index page
    SeasonsFound { count: usize },

    /// All season pages read
    EpisodesFound { count: usize },

    /// Starting work on one episode
    DownloadingEpisode {
        index: usize,
        total: usize,
        season_number: usize,
        episode_number: usize,
        title: String,
    },

    /// Bytes written for the current video so far
    TransferProgress(TransferProgress),

    /// The video was already complete on disk; only the NFO was rewritten
    EpisodeSkipped { video_path: PathBuf },

    /// The video was downloaded and the NFO written
    EpisodeDownloaded { video_path: PathBuf, bytes: u64 },

    /// Every episode processed
    Complete {
        downloaded: usize,
        skipped: usize,
    },
}

/// One row of the catalog listing printed by `--list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub season_number: usize,
    pub episode_number: usize,
    pub title: String,
    pub episode_page: String,
}

/// Top-level error type for Tōku Reo operations
#[derive(Debug, Error)]
pub enum TokuReoError {
    /// Error while talking to the website
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error while reading seasons or episodes
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error while downloading an episode
    #[error("Episode download error: {0}")]
    EpisodeDownload(#[from] EpisodeDownloadError),

    /// Error while generating metadata
    #[error("Metadata error: {0}")]
    Nfo(#[from] NfoError),

    /// Error while writing output files
    #[error("File error: {0}")]
    File(#[from] FileOperationError),
}

/// Folder an episode of the given season is stored in
pub fn season_folder(destination: &Path, season_number: usize) -> PathBuf {
    destination.join(format!("Season {season_number}"))
}

/// Lists every episode of every season without downloading anything
pub fn catalog_listing(client: &SiteClient) -> Result<Vec<CatalogEntry>, TokuReoError> {
    let mut entries = Vec::new();
    for season in list_seasons(client)? {
        for episode in season.episodes()? {
            entries.push(CatalogEntry {
                season_number: episode.season_number,
                episode_number: episode.episode_number,
                title: episode.title,
                episode_page: episode.episode_page,
            });
        }
    }
    Ok(entries)
}

/// Archives the whole series into `destination`
///
/// Writes `tvshow.nfo`, then downloads every episode (season by season, in
/// site order) into a `Season {N}` folder together with its NFO. Episodes
/// are processed one after another; the first failure aborts the run and
/// leaves everything written so far on disk. Rerunning skips videos that
/// are already complete.
///
/// Progress events are emitted through the provided callback, allowing library
/// users to display status or remain silent.
///
/// # Examples
///
/// ```no_run
/// use toku_reo::{HttpTransport, ProgressEvent, SiteClient, archive_series, site};
/// use std::path::Path;
///
/// let client = SiteClient::new(Box::new(HttpTransport::new()), site::BASE_URL).unwrap();
/// archive_series(&client, Path::new("/media/tv/Toku Reo"), |event| {
///     if let ProgressEvent::DownloadingEpisode { index, total, title, .. } = event {
///         println!("[{}/{}] {}", index + 1, total, title);
///     }
/// })
/// .unwrap();
/// ```
pub fn archive_series<F>(
    client: &SiteClient,
    destination: &Path,
    mut progress_callback: F,
) -> Result<(), TokuReoError>
where
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::Started {
        destination: destination.to_path_buf(),
    });

    ensure_directory(destination)?;
    let show_path = destination.join(TVSHOW_NFO);
    write_nfo(&show_path, &tvshow_nfo()?)?;
    info!(path = %show_path.display(), "wrote series metadata");
    progress_callback(ProgressEvent::ShowMetadataWritten { path: show_path });

    let seasons = list_seasons(client)?;
    progress_callback(ProgressEvent::SeasonsFound {
        count: seasons.len(),
    });

    let mut episodes = Vec::new();
    for season in &seasons {
        episodes.extend(season.episodes()?);
    }
    progress_callback(ProgressEvent::EpisodesFound {
        count: episodes.len(),
    });

    let mut downloaded = 0;
    let mut skipped = 0;

    for (index, episode) in episodes.iter().enumerate() {
        progress_callback(ProgressEvent::DownloadingEpisode {
            index,
            total: episodes.len(),
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            title: episode.title.clone(),
        });

        let folder = season_folder(destination, episode.season_number);
        let result = episode.download(&folder, |progress| {
            progress_callback(ProgressEvent::TransferProgress(progress))
        })?;

        match result.outcome {
            DownloadOutcome::Skipped => {
                skipped += 1;
                progress_callback(ProgressEvent::EpisodeSkipped {
                    video_path: result.video_path,
                });
            }
            DownloadOutcome::Downloaded { bytes } => {
                downloaded += 1;
                progress_callback(ProgressEvent::EpisodeDownloaded {
                    video_path: result.video_path,
                    bytes,
                });
            }
        }
    }

    progress_callback(ProgressEvent::Complete {
        downloaded,
        skipped,
    });

    Ok(())
}
