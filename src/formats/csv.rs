//! Semicolon-delimited CSV playlist parser.
//!
//! The first line is a header row. Header names are matched
//! case-insensitively; `track` and `song` are accepted as aliases for the
//! title column. Column order is irrelevant and unrecognized columns are
//! ignored. Per-row problems are recorded as skips, never raised.

use crate::formats::ParsedPlaylist;
use crate::song::{RawRecord, SkipReason, SkippedEntry};

const DELIMITER: char = ';';

#[derive(Debug, Default)]
struct ColumnMap {
    title: Option<usize>,
    artist: Option<usize>,
    album: Option<usize>,
    isrc: Option<usize>,
}

fn map_header(header_line: &str) -> ColumnMap {
    let mut columns = ColumnMap::default();
    for (index, raw_name) in header_line.split(DELIMITER).enumerate() {
        let name = raw_name.trim();
        if name.eq_ignore_ascii_case("title")
            || name.eq_ignore_ascii_case("track")
            || name.eq_ignore_ascii_case("song")
        {
            columns.title.get_or_insert(index);
        } else if name.eq_ignore_ascii_case("artist") {
            columns.artist.get_or_insert(index);
        } else if name.eq_ignore_ascii_case("album") {
            columns.album.get_or_insert(index);
        } else if name.eq_ignore_ascii_case("isrc") {
            columns.isrc.get_or_insert(index);
        }
    }
    columns
}

fn field(fields: &[&str], index: Option<usize>) -> Option<String> {
    index
        .and_then(|index| fields.get(index))
        .map(|value| value.to_string())
}

pub(crate) fn parse(raw: &str) -> ParsedPlaylist {
    let mut parsed = ParsedPlaylist::default();
    let mut lines = raw.lines();

    let Some(header_line) = lines.next() else {
        return parsed;
    };
    let columns = map_header(header_line);
    let expected_field_count = header_line.split(DELIMITER).count();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != expected_field_count {
            parsed
                .skipped
                .push(SkippedEntry::new(line.trim(), SkipReason::MalformedRow));
            continue;
        }
        let title = field(&fields, columns.title).unwrap_or_default();
        if title.trim().is_empty() {
            parsed
                .skipped
                .push(SkippedEntry::new(line.trim(), SkipReason::MissingTitle));
            continue;
        }
        parsed.records.push(RawRecord {
            title,
            artist: field(&fields, columns.artist),
            album: field(&fields, columns.album),
            isrc: field(&fields, columns.isrc),
        });
    }
    parsed
}
