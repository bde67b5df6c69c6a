use crate::site;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur while preparing or writing output files
#[derive(Debug, Error)]
pub enum FileOperationError {
    /// Failed to create an output directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write an output file
    #[error("Failed to write file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Sanitizes a string for use in filenames by replacing problematic characters
///
/// Replaces characters that are invalid or problematic in filenames across platforms:
/// - Path separators: / \
/// - Reserved characters: : * ? " < > |
/// - Control characters
/// - Trim leading/trailing whitespace and dots
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    sanitized
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string()
}

/// Filename stem shared by an episode's video and NFO file
///
/// ```
/// use toku_reo::episode_stem;
///
/// assert_eq!(episode_stem(1, 2, "Greetings"), "S01E02 - Tōku Reo - Greetings");
/// ```
pub fn episode_stem(season: usize, episode: usize, title: &str) -> String {
    format!(
        "S{:02}E{:02} - {} - {}",
        season,
        episode,
        site::SERIES_NAME,
        sanitize_filename(title)
    )
}

/// Extension (without dot) of the last path segment of a URL.
///
/// Empty when the segment has no suffix. A leading dot alone (`.hidden`)
/// does not count as a suffix.
pub fn extension_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
        _ => String::new(),
    }
}

/// Joins a stem and an extension, leaving the stem bare when the extension is empty
pub fn file_name(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

/// Creates a directory and its parents; an existing directory is fine
pub fn ensure_directory(path: &Path) -> Result<(), FileOperationError> {
    fs::create_dir_all(path).map_err(|e| FileOperationError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes a metadata document, replacing any existing file
pub fn write_nfo(path: &Path, contents: &str) -> Result<(), FileOperationError> {
    fs::write(path, contents).map_err(|e| FileOperationError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Normal Title"), "Normal Title");
        assert_eq!(sanitize_filename("Kai: Food"), "Kai- Food");
        assert_eq!(sanitize_filename("Either/Or"), "Either-Or");
        assert_eq!(sanitize_filename("  Spaces  "), "Spaces");
        assert_eq!(sanitize_filename("Ka kite..."), "Ka kite");
    }

    #[test]
    fn test_episode_stem_is_zero_padded() {
        assert_eq!(
            episode_stem(1, 1, "Introductions"),
            "S01E01 - Tōku Reo - Introductions"
        );
        assert_eq!(
            episode_stem(3, 12, "Te Reo/Tikanga"),
            "S03E12 - Tōku Reo - Te Reo-Tikanga"
        );
    }

    #[test]
    fn test_extension_from_url() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert_eq!(extension_from_url(&url("http://a.test/media/ep1.mp4")), "mp4");
        assert_eq!(extension_from_url(&url("http://a.test/media/ep1.tar.gz?x=1")), "gz");
        assert_eq!(extension_from_url(&url("http://a.test/media/stream")), "");
        assert_eq!(extension_from_url(&url("http://a.test/media/.hidden")), "");
        assert_eq!(extension_from_url(&url("http://a.test/")), "");
    }

    #[test]
    fn test_file_name_without_extension() {
        assert_eq!(file_name("S01E01 - x", "mp4"), "S01E01 - x.mp4");
        assert_eq!(file_name("S01E01 - x", ""), "S01E01 - x");
    }

    #[test]
    fn test_write_nfo_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.nfo");
        write_nfo(&path, "first").unwrap();
        write_nfo(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_ensure_directory_existing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Season 1");
        ensure_directory(&nested).unwrap();
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
