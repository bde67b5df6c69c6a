//! NFO metadata documents
//!
//! Media-library software (Kodi, Jellyfin) reads `tvshow.nfo` and one
//! `<episode>.nfo` per video to fill in titles, plots and air dates without
//! scraping. Documents are built element by element with quick-xml, so text
//! scraped from the site is always escaped.

use crate::site;
use chrono::NaiveDate;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::Cursor;
use thiserror::Error;

/// Errors that can occur while serializing a metadata document
#[derive(Debug, Error)]
pub enum NfoError {
    /// The XML writer rejected an event
    #[error("Failed to write XML: {0}")]
    Write(#[from] std::io::Error),

    /// The serialized document was not valid UTF-8
    #[error("Generated document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Everything the episode document needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDetails {
    pub season_number: usize,
    pub episode_number: usize,
    pub title: String,
    pub plot: String,
    pub aired: NaiveDate,
}

impl EpisodeDetails {
    /// Identifier of the form `tokureo-s1e1`, without zero-padding
    pub fn unique_id(&self) -> String {
        format!(
            "{}-s{}e{}",
            site::SERIES_SLUG,
            self.season_number,
            self.episode_number
        )
    }
}

/// Generates the series-level `tvshow.nfo` document.
///
/// Depends only on constants, so repeated calls return identical text.
pub fn tvshow_nfo() -> Result<String, NfoError> {
    let mut doc = NfoWriter::new()?;
    doc.open("tvshow")?;
    doc.text_element("title", site::SERIES_NAME)?;
    doc.unique_id(site::SHOW_UNIQUE_ID)?;
    doc.close("tvshow")?;
    doc.finish()
}

/// Generates the `episodedetails` document for one episode
pub fn episode_nfo(details: &EpisodeDetails) -> Result<String, NfoError> {
    let mut doc = NfoWriter::new()?;
    doc.open("episodedetails")?;
    doc.text_element("title", &details.title)?;
    doc.text_element("plot", &details.plot)?;
    doc.unique_id(&details.unique_id())?;
    doc.text_element("aired", &details.aired.format("%Y-%m-%d").to_string())?;
    doc.close("episodedetails")?;
    doc.finish()
}

/// Thin wrapper over an indenting quick-xml writer
struct NfoWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl NfoWriter {
    fn new() -> Result<Self, NfoError> {
        let mut nfo = Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        };
        nfo.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(nfo)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), NfoError> {
        self.writer.write_event(event)?;
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<(), NfoError> {
        self.emit(Event::Start(BytesStart::new(name)))
    }

    fn close(&mut self, name: &str) -> Result<(), NfoError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), NfoError> {
        self.open(name)?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// `<uniqueid type="" default="true">id</uniqueid>`
    fn unique_id(&mut self, id: &str) -> Result<(), NfoError> {
        let mut elem = BytesStart::new("uniqueid");
        elem.push_attribute(("type", ""));
        elem.push_attribute(("default", "true"));
        self.emit(Event::Start(elem))?;
        self.emit(Event::Text(BytesText::new(id)))?;
        self.close("uniqueid")
    }

    fn finish(self) -> Result<String, NfoError> {
        let mut bytes = self.writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> EpisodeDetails {
        EpisodeDetails {
            season_number: 1,
            episode_number: 1,
            title: "Introductions".to_string(),
            plot: "Learn to introduce yourself.".to_string(),
            aired: NaiveDate::from_ymd_opt(2020, 6, 3).unwrap(),
        }
    }

    #[test]
    fn test_tvshow_nfo_layout() {
        let nfo = tvshow_nfo().unwrap();
        assert!(nfo.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(nfo.contains("<tvshow>"));
        assert!(nfo.contains("<title>Tōku Reo</title>"));
        assert!(nfo.contains(r#"<uniqueid type="" default="true">tokureo</uniqueid>"#));
        assert!(nfo.trim_end().ends_with("</tvshow>"));
    }

    #[test]
    fn test_tvshow_nfo_is_stable() {
        assert_eq!(tvshow_nfo().unwrap(), tvshow_nfo().unwrap());
    }

    #[test]
    fn test_episode_nfo_fields() {
        let nfo = episode_nfo(&details()).unwrap();
        assert!(nfo.contains("<episodedetails>"));
        assert!(nfo.contains("<title>Introductions</title>"));
        assert!(nfo.contains("<plot>Learn to introduce yourself.</plot>"));
        assert!(nfo.contains(r#"<uniqueid type="" default="true">tokureo-s1e1</uniqueid>"#));
        assert!(nfo.contains("<aired>2020-06-03</aired>"));
    }

    #[test]
    fn test_write_error_keeps_source() {
        let err = NfoError::from(std::io::Error::other("disk full"));
        let inner = std::error::Error::source(&err).unwrap();
        assert!(inner.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_unique_id_is_not_padded() {
        let mut d = details();
        d.season_number = 2;
        d.episode_number = 12;
        assert_eq!(d.unique_id(), "tokureo-s2e12");
    }

    #[test]
    fn test_scraped_text_is_escaped() {
        let mut d = details();
        d.title = "Kai & <Inu>".to_string();
        d.plot = "a < b && c > d".to_string();
        let nfo = episode_nfo(&d).unwrap();
        assert!(nfo.contains("<title>Kai &amp; &lt;Inu&gt;</title>"));
        assert!(nfo.contains("<plot>a &lt; b &amp;&amp; c &gt; d</plot>"));
    }
}
