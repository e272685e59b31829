//! Core data model shared across the parsing, matching, and reconciliation
//! stages.

/// One entry as extracted from a playlist file, before normalization.
///
/// Fields are kept exactly as the parser found them; duplicates are legal and
/// source order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub isrc: Option<String>,
}

impl RawRecord {
    pub fn new(title: impl Into<String>, artist: Option<String>) -> Self {
        Self {
            title: title.into(),
            artist,
            album: None,
            isrc: None,
        }
    }
}

/// Normalized form of a [`RawRecord`]: all fields trimmed, empty strings
/// converted to absent. `title` is never empty; records without an
/// extractable title are dropped before this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongQuery {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub isrc: Option<String>,
}

impl SongQuery {
    /// Human-readable label used in logs and the skip report.
    pub fn display_label(&self) -> String {
        match &self.artist {
            Some(artist) => format!("{} - {}", artist, self.title),
            None => self.title.clone(),
        }
    }
}

/// Machine-readable tag explaining why a record did not produce an addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    MalformedRow,
    NotFound,
    Duplicate,
}

impl SkipReason {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::MalformedRow => "malformed_row",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
        }
    }
}

/// A record that was dropped at some stage, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Label for the source record: a raw line excerpt for parse-stage skips,
    /// `Artist - Title` once a query exists.
    pub entry: String,
    pub reason: SkipReason,
}

impl SkippedEntry {
    pub fn new(entry: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            entry: entry.into(),
            reason,
        }
    }
}
