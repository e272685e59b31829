//! Extended playlist (M3U/M3U8) parser.
//!
//! A `#EXTINF:<duration>,<Artist> - <Title>` directive line describes the
//! track; the path line that follows it confirms the entry and is otherwise
//! ignored. Directives without a following path line are dropped, and a
//! second directive before a path line replaces the first. Comments, blank
//! lines, and malformed directives are tolerated.

use crate::formats::{split_artist_title, ParsedPlaylist};
use crate::song::RawRecord;

const DIRECTIVE_TAG: &str = "#EXTINF:";

fn parse_directive(line: &str) -> Option<RawRecord> {
    let rest = line.strip_prefix(DIRECTIVE_TAG)?;
    let (duration, info) = rest.split_once(',')?;
    if duration.is_empty() || !duration.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    if info.is_empty() {
        return None;
    }
    match split_artist_title(info) {
        Some((artist, title)) => Some(RawRecord::new(title, Some(artist.to_string()))),
        None => Some(RawRecord::new(info, None)),
    }
}

pub(crate) fn parse(raw: &str) -> ParsedPlaylist {
    let mut parsed = ParsedPlaylist::default();
    let mut pending: Option<RawRecord> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.starts_with(DIRECTIVE_TAG) {
            if let Some(record) = parse_directive(line) {
                pending = Some(record);
            }
        } else if !line.is_empty() && !line.starts_with('#') {
            // Path line: confirms the pending directive, content unused.
            if let Some(record) = pending.take() {
                parsed.records.push(record);
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn test_directive_splits_artist_and_title_on_first_separator() {
        let parsed = parse("#EXTINF:180,Tom Waits - Alice\n/music/alice.flac\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].artist.as_deref(), Some("Tom Waits"));
        assert_eq!(parsed.records[0].title, "Alice");

        let parsed = parse("#EXTINF:210,A - B - C\n/music/x.flac\n");
        assert_eq!(parsed.records[0].artist.as_deref(), Some("A"));
        assert_eq!(parsed.records[0].title, "B - C");
    }

    #[test]
    fn test_directive_without_separator_is_title_only() {
        let parsed = parse("#EXTINF:95,Intro\n/music/intro.mp3\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].title, "Intro");
        assert!(parsed.records[0].artist.is_none());
    }

    #[test]
    fn test_header_comments_and_blank_lines_are_tolerated() {
        let raw = "#EXTM3U\n\n#EXTINF:180,Tom Waits - Alice\n\n#PLAYLIST:mix\n/music/alice.flac\n";
        let parsed = parse(raw);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].title, "Alice");
    }

    #[test]
    fn test_path_without_directive_is_ignored() {
        let parsed = parse("/music/unlabeled.flac\n#EXTINF:180,Tom Waits - Alice\n/a.flac\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].title, "Alice");
    }

    #[test]
    fn test_trailing_directive_without_path_is_dropped() {
        let parsed = parse("#EXTINF:180,Tom Waits - Alice\n/a.flac\n#EXTINF:200,Tom Waits - November\n");
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn test_second_directive_replaces_unconfirmed_first() {
        let parsed = parse("#EXTINF:180,Tom Waits - Alice\n#EXTINF:200,Tom Waits - November\n/b.flac\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].title, "November");
    }

    #[test]
    fn test_malformed_directives_are_ignored() {
        let parsed = parse("#EXTINF:abc,Tom Waits - Alice\n/a.flac\n#EXTINF:180\n/b.flac\n#EXTINF:90,\n/c.flac\n");
        assert!(parsed.records.is_empty());
    }
}
