//! Field extraction from parsed pages.
//!
//! Every function here is pure: it takes an already fetched document and
//! pulls one fact out of it. The catalog entities call these on their
//! memoized documents, so reading several attributes costs a single fetch.

use super::CatalogError;
use crate::site;
use scraper::{ElementRef, Html, Selector};

/// One episode anchor of a season page, before URL resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EpisodeLink {
    pub href: String,
    pub episode_number: usize,
    pub title: String,
}

fn selector(css: &'static str) -> Selector {
    // Selectors are compile-time constants from `site`; a parse failure is a programming error
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Text nodes of an element, trimmed, with empty ones dropped
fn stripped_strings<'a>(element: &ElementRef<'a>) -> Vec<&'a str> {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collapses the text of an element into one string
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Hrefs of the season links on the index page, in document order.
///
/// Fails if the listing container is absent; an empty listing yields no
/// seasons. An anchor without `href` is an error, since skipping it would
/// shift the numbering of every later season.
pub(crate) fn season_links(document: &Html) -> Result<Vec<String>, CatalogError> {
    let listings: Vec<ElementRef<'_>> =
        document.select(&selector(site::SEASON_LISTING)).collect();
    if listings.is_empty() {
        return Err(CatalogError::MissingElement {
            selector: site::SEASON_LISTING,
        });
    }

    let anchors = selector(site::ANCHORS);
    listings
        .iter()
        .flat_map(|listing| listing.select(&anchors))
        .map(|a| {
            a.value()
                .attr("href")
                .map(str::to_string)
                .ok_or_else(|| CatalogError::InvalidSeasonAnchor {
                    anchor: element_text(&a),
                })
        })
        .collect()
}

/// Episode anchors of a season page: every `<a>` wrapping an episode marker.
///
/// The leading text token is the episode number, the trailing token the title.
/// For an anchor with a single token both facts come from that token.
pub(crate) fn episode_links(document: &Html) -> Result<Vec<EpisodeLink>, CatalogError> {
    let marker = selector(site::EPISODE_MARKER);

    document
        .select(&selector(site::ANCHORS))
        .filter(|a| a.select(&marker).next().is_some())
        .map(|a| -> Result<EpisodeLink, CatalogError> {
            let tokens = stripped_strings(&a);
            let (first, last) = match (tokens.first(), tokens.last()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => {
                    return Err(CatalogError::InvalidEpisodeAnchor {
                        anchor: element_text(&a),
                        reason: "anchor has no text".to_string(),
                    });
                }
            };

            let episode_number = first.parse::<usize>().map_err(|_| {
                CatalogError::InvalidEpisodeAnchor {
                    anchor: element_text(&a),
                    reason: format!("leading token {first:?} is not an episode number"),
                }
            })?;

            let href = a
                .value()
                .attr("href")
                .ok_or_else(|| CatalogError::InvalidEpisodeAnchor {
                    anchor: element_text(&a),
                    reason: "anchor has no href".to_string(),
                })?;

            Ok(EpisodeLink {
                href: href.to_string(),
                episode_number,
                title: last.to_string(),
            })
        })
        .collect()
}

/// Text of the first paragraph in the main column
pub(crate) fn description(document: &Html) -> Result<String, CatalogError> {
    document
        .select(&selector(site::DESCRIPTION))
        .next()
        .map(|p| element_text(&p))
        .ok_or(CatalogError::MissingElement {
            selector: site::DESCRIPTION,
        })
}

/// Href of the first download link in the streaming block
pub(crate) fn video_href(document: &Html) -> Result<String, CatalogError> {
    document
        .select(&selector(site::VIDEO_LINK))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
        .ok_or(CatalogError::MissingElement {
            selector: site::VIDEO_LINK,
        })
}

/// Raw text of the air date marker, decoration included
pub(crate) fn air_date_text(document: &Html) -> Result<String, CatalogError> {
    document
        .select(&selector(site::AIR_DATE))
        .next()
        .map(|e| element_text(&e))
        .ok_or(CatalogError::MissingElement {
            selector: site::AIR_DATE,
        })
}
