//! Playlist file format detection and parser dispatch.

mod csv;
mod extended;
mod free_text;

use std::path::Path;

use crate::song::{RawRecord, SkippedEntry};

/// Closed set of supported playlist file formats, selected once per run by
/// extension. Unknown extensions fall through to the free-text parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Csv,
    ExtendedPlaylist,
    FreeText,
}

/// Result of parsing one playlist file: the extracted records in source
/// order, plus every line that was dropped along the way.
#[derive(Debug, Default)]
pub struct ParsedPlaylist {
    pub records: Vec<RawRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl FormatKind {
    /// Selects the parser for a file path by extension alone; content
    /// sniffing is deliberately not performed.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if extension.eq_ignore_ascii_case("csv") {
            Self::Csv
        } else if extension.eq_ignore_ascii_case("m3u") || extension.eq_ignore_ascii_case("m3u8") {
            Self::ExtendedPlaylist
        } else {
            Self::FreeText
        }
    }

    pub fn parse(self, raw: &str) -> ParsedPlaylist {
        match self {
            Self::Csv => csv::parse(raw),
            Self::ExtendedPlaylist => extended::parse(raw),
            Self::FreeText => free_text::parse(raw),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::ExtendedPlaylist => "extended playlist",
            Self::FreeText => "free text",
        }
    }
}

/// Splits on the first ` - ` occurrence, the separator shared by the extended
/// playlist and free-text formats.
pub(crate) fn split_artist_title(text: &str) -> Option<(&str, &str)> {
    text.split_once(" - ")
}
