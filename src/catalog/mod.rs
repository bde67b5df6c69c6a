//! Seasons and episodes scraped from the website.
//!
//! Both entities fetch their own page lazily and keep the parsed document
//! for the rest of their life, so reading several attributes of an episode
//! costs a single request. Attributes themselves are derived anew on every
//! call from that cached document.

mod date;
mod extract;

use crate::downloader::{DownloadError, DownloadOutcome, TransferProgress, download_file};
use crate::fetcher::{FetchError, SiteClient};
use crate::file_operations::{
    FileOperationError, ensure_directory, episode_stem, extension_from_url, file_name, write_nfo,
};
use crate::nfo::{self, EpisodeDetails, NfoError};
use crate::site;
use chrono::NaiveDate;
use scraper::Html;
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use url::Url;

/// Errors that can occur while reading the catalog from the website
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Fetching a page failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A page lacks an element the scraper relies on
    #[error("Expected element '{selector}' not found on page")]
    MissingElement { selector: &'static str },

    /// A season link on the index page has no target
    #[error("Season link {anchor:?} has no href")]
    InvalidSeasonAnchor { anchor: String },

    /// An episode anchor does not have the expected shape
    #[error("Invalid episode link {anchor:?}: {reason}")]
    InvalidEpisodeAnchor { anchor: String, reason: String },

    /// The air date text could not be parsed
    #[error("Unparseable air date: {0:?}")]
    UnparseableDate(String),

    /// Generating the metadata document failed
    #[error(transparent)]
    Nfo(#[from] NfoError),
}

/// Errors that can occur while downloading one episode
#[derive(Debug, Error)]
pub enum EpisodeDownloadError {
    /// Reading the detail page or building the NFO failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Transferring the video failed
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Creating the season folder or writing the NFO failed
    #[error(transparent)]
    File(#[from] FileOperationError),
}

/// Fetches `path` into `slot` on first use and returns the cached document afterwards
fn memoized<'s>(
    slot: &'s OnceCell<Html>,
    client: &SiteClient,
    path: &str,
) -> Result<&'s Html, FetchError> {
    if let Some(document) = slot.get() {
        return Ok(document);
    }
    let document = client.fetch(path)?;
    Ok(slot.get_or_init(|| document))
}

/// Lists the seasons linked from the index page.
///
/// Seasons are numbered from 1 in the order the index lists them.
pub fn list_seasons(client: &SiteClient) -> Result<Vec<Season<'_>>, CatalogError> {
    let index = client.fetch(site::INDEX_PAGE)?;
    let seasons = extract::season_links(&index)?
        .into_iter()
        .enumerate()
        .map(|(i, page)| Season::new(client, i + 1, page))
        .collect();
    Ok(seasons)
}

/// One season of the series
pub struct Season<'c> {
    /// 1-based position in the index listing
    pub season_number: usize,
    /// Link to the season page as found on the index
    pub season_page: String,
    client: &'c SiteClient,
    document: OnceCell<Html>,
}

impl<'c> Season<'c> {
    pub fn new(client: &'c SiteClient, season_number: usize, season_page: String) -> Self {
        Self {
            season_number,
            season_page,
            client,
            document: OnceCell::new(),
        }
    }

    fn document(&self) -> Result<&Html, FetchError> {
        memoized(&self.document, self.client, &self.season_page)
    }

    /// Episodes linked from the season page, in document order.
    ///
    /// The page is fetched once; the list itself is rebuilt on every call and
    /// each returned episode fetches its own detail page independently.
    pub fn episodes(&self) -> Result<Vec<Episode<'c>>, CatalogError> {
        let page_url = self.client.resolve(&self.season_page)?;
        extract::episode_links(self.document()?)?
            .into_iter()
            .map(|link| -> Result<Episode<'c>, CatalogError> {
                let episode_page = page_url.join(&link.href).map_err(|e| {
                    FetchError::InvalidUrl {
                        url: link.href.clone(),
                        source: e,
                    }
                })?;
                Ok(Episode::new(
                    self.client,
                    self.season_number,
                    link.episode_number,
                    episode_page.to_string(),
                    link.title,
                ))
            })
            .collect()
    }
}

impl fmt::Debug for Season<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Season")
            .field("season_number", &self.season_number)
            .field("season_page", &self.season_page)
            .finish_non_exhaustive()
    }
}

/// One episode, with its detail page fetched on first attribute access
pub struct Episode<'c> {
    pub season_number: usize,
    pub episode_number: usize,
    /// Absolute URL of the detail page
    pub episode_page: String,
    pub title: String,
    client: &'c SiteClient,
    document: OnceCell<Html>,
}

impl<'c> Episode<'c> {
    pub fn new(
        client: &'c SiteClient,
        season_number: usize,
        episode_number: usize,
        episode_page: String,
        title: String,
    ) -> Self {
        Self {
            season_number,
            episode_number,
            episode_page,
            title,
            client,
            document: OnceCell::new(),
        }
    }

    fn document(&self) -> Result<&Html, FetchError> {
        memoized(&self.document, self.client, &self.episode_page)
    }

    /// Text of the first paragraph on the detail page
    pub fn description(&self) -> Result<String, CatalogError> {
        extract::description(self.document()?)
    }

    /// Absolute URL of the video, resolved against the detail page
    pub fn video_url(&self) -> Result<String, CatalogError> {
        Ok(self.resolved_video_url()?.to_string())
    }

    fn resolved_video_url(&self) -> Result<Url, CatalogError> {
        let href = extract::video_href(self.document()?)?;
        let base = self.client.resolve(&self.episode_page)?;
        let url = base.join(&href).map_err(|e| FetchError::InvalidUrl {
            url: href.clone(),
            source: e,
        })?;
        Ok(url)
    }

    /// Air date shown on the detail page
    pub fn air_date(&self) -> Result<NaiveDate, CatalogError> {
        let raw = extract::air_date_text(self.document()?)?;
        date::parse_air_date(&raw).ok_or(CatalogError::UnparseableDate(raw))
    }

    /// Values that go into this episode's NFO document
    pub fn details(&self) -> Result<EpisodeDetails, CatalogError> {
        Ok(EpisodeDetails {
            season_number: self.season_number,
            episode_number: self.episode_number,
            title: self.title.clone(),
            plot: self.description()?,
            aired: self.air_date()?,
        })
    }

    /// The `episodedetails` NFO document
    pub fn nfo(&self) -> Result<String, CatalogError> {
        Ok(nfo::episode_nfo(&self.details()?)?)
    }

    /// Filename stem shared by the video and its NFO
    pub fn file_stem(&self) -> String {
        episode_stem(self.season_number, self.episode_number, &self.title)
    }

    /// Downloads the video into `folder` and writes the NFO next to it.
    ///
    /// The folder is created if needed. The video is skipped when a file of
    /// the announced size already exists; the NFO is always rewritten.
    pub fn download<F>(
        &self,
        folder: &Path,
        on_progress: F,
    ) -> Result<EpisodeDownload, EpisodeDownloadError>
    where
        F: FnMut(TransferProgress),
    {
        ensure_directory(folder)?;

        let stem = self.file_stem();
        let video_url = self.resolved_video_url()?;
        let video_name = file_name(&stem, &extension_from_url(&video_url));
        let video_path = folder.join(&video_name);

        let outcome = download_file(
            self.client,
            video_url.as_str(),
            &video_path,
            &video_name,
            on_progress,
        )?;

        let nfo_path = folder.join(file_name(&stem, "nfo"));
        write_nfo(&nfo_path, &self.nfo()?)?;
        info!(path = %nfo_path.display(), "wrote episode metadata");

        Ok(EpisodeDownload {
            video_path,
            nfo_path,
            outcome,
        })
    }
}

impl fmt::Debug for Episode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Episode")
            .field("season_number", &self.season_number)
            .field("episode_number", &self.episode_number)
            .field("episode_page", &self.episode_page)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Files produced by [`Episode::download`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDownload {
    pub video_path: PathBuf,
    pub nfo_path: PathBuf,
    pub outcome: DownloadOutcome,
}
