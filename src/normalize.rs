//! Turns raw parser output into canonical [`SongQuery`] values.
//!
//! Trims every field and converts empty or all-whitespace strings to absent.
//! Casing and punctuation are preserved exactly; any fuzziness belongs to the
//! resolver, not to this stage.

use crate::song::{RawRecord, SkipReason, SkippedEntry, SongQuery};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Normalizes records in order. Records whose title trims to nothing are
/// dropped and recorded with reason `missing_title`.
pub fn normalize_records(records: Vec<RawRecord>) -> (Vec<SongQuery>, Vec<SkippedEntry>) {
    let mut queries = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        let title = record.title.trim();
        if title.is_empty() {
            let label = record
                .artist
                .as_deref()
                .map(str::trim)
                .filter(|artist| !artist.is_empty())
                .map(|artist| format!("{artist} - <untitled>"))
                .unwrap_or_else(|| "<untitled>".to_string());
            skipped.push(SkippedEntry::new(label, SkipReason::MissingTitle));
            continue;
        }
        queries.push(SongQuery {
            title: title.to_string(),
            artist: non_empty(record.artist),
            album: non_empty(record.album),
            isrc: non_empty(record.isrc),
        });
    }
    (queries, skipped)
}
