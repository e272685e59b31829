//! Run-level error taxonomy for the import pipeline.
//!
//! Per-record problems (a malformed row, a missing title, an unmatched song)
//! are never errors; they travel through the skip/report mechanism so a single
//! bad line cannot abort a multi-hundred-track import. Everything in this enum
//! aborts the run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read playlist file {}: {source}", path.display())]
    UnreadableInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no usable entries found in {} ({skipped} entries skipped)", path.display())]
    EmptyPlaylist { path: PathBuf, skipped: usize },

    #[error("catalog search failed: {0}")]
    ResolverUnavailable(String),

    #[error("playlist request failed: {0}")]
    StoreUnavailable(String),

    #[error("playlist '{0}' not found; pass --create-playlist to create it")]
    PlaylistNotFound(String),

    #[error("appended only {added} of {requested} tracks: {message}")]
    PartialAppend {
        added: usize,
        requested: usize,
        message: String,
    },

    #[error("no password available for profile '{0}'; pass --password, set TUNELIFT_PASSWORD, or store one in the keyring")]
    MissingCredentials(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
