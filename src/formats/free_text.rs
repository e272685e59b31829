//! Free-text playlist parser: one song per line.
//!
//! Ordered pattern rules, first match wins:
//! 1. `Artist - Title` (first ` - ` occurrence)
//! 2. `Title by Artist` (first ` by ` occurrence, case-insensitive)
//! 3. the whole line is the title, artist absent

use crate::formats::{split_artist_title, ParsedPlaylist};
use crate::song::RawRecord;

fn split_title_by_artist(line: &str) -> Option<(&str, &str)> {
    // ASCII lowercasing preserves byte offsets, so the index maps back
    // directly onto the original line.
    let separator_start = line.to_ascii_lowercase().find(" by ")?;
    let title = &line[..separator_start];
    let artist = &line[separator_start + " by ".len()..];
    Some((title, artist))
}

pub(crate) fn parse(raw: &str) -> ParsedPlaylist {
    let mut parsed = ParsedPlaylist::default();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = if let Some((artist, title)) = split_artist_title(line) {
            RawRecord::new(title, Some(artist.to_string()))
        } else if let Some((title, artist)) = split_title_by_artist(line) {
            RawRecord::new(title, Some(artist.to_string()))
        } else {
            RawRecord::new(line, None)
        };
        parsed.records.push(record);
    }
    parsed
}
