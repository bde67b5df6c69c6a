//! Fixed facts about the Tōku Reo website and the series it hosts.
//!
//! The scraper depends on the markup of a single site, so every selector it
//! uses is collected here. A structural change upstream only needs edits in
//! this file.

/// Origin all page paths are resolved against
pub const BASE_URL: &str = "http://www.tokureo.maori.nz/";

/// Path of the page listing every season
pub const INDEX_PAGE: &str = "index.html";

/// Display name of the series, used in filenames and `tvshow.nfo`
pub const SERIES_NAME: &str = "Tōku Reo";

/// Prefix of the per-episode unique identifier (`tokureo-s1e1`)
pub const SERIES_SLUG: &str = "tokureo";

/// Unique identifier written into `tvshow.nfo`
pub const SHOW_UNIQUE_ID: &str = "tokureo";

/// Container of the season links on the index page
pub(crate) const SEASON_LISTING: &str = "ul.seriesPick";

/// Anchors; inside [`SEASON_LISTING`] they are seasons, on a season page only
/// those wrapping an [`EPISODE_MARKER`] are episodes
pub(crate) const ANCHORS: &str = "a";

/// Marker element inside an episode anchor
pub(crate) const EPISODE_MARKER: &str = "span.episode";

/// Paragraphs of the main column on an episode detail page
pub(crate) const DESCRIPTION: &str = "div.maincol p";

/// Download link of the episode video
pub(crate) const VIDEO_LINK: &str = "div.streaming a.download";

/// Element holding the air date, e.g. `- 3 June 2020 -`
pub(crate) const AIR_DATE: &str = "span.date";
