//! Catalog capability abstractions and concrete backend implementations.

pub mod opensubsonic;

use crate::error::ImportError;

/// Candidate track returned by a resolver lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    pub track_id: String,
    pub artist: String,
    pub title: String,
}

/// Handle to a named remote playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistHandle {
    pub playlist_id: String,
    pub name: String,
}

/// Connection profile passed explicitly into every backend call; the crate
/// holds no process-wide credential state.
#[derive(Debug, Clone)]
pub struct ProfileAuth {
    pub profile_id: String,
    pub endpoint: String,
    pub username: String,
    pub password: String,
}

/// Maps a text or identifier query to at most one catalog track candidate.
pub trait TrackResolver {
    fn find_by_identifier(
        &self,
        profile: &ProfileAuth,
        isrc: &str,
    ) -> Result<Option<TrackCandidate>, ImportError>;

    fn search_by_text(
        &self,
        profile: &ProfileAuth,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<TrackCandidate>, ImportError>;
}

/// Reads, creates, and appends to a named playlist in the catalog.
pub trait PlaylistStore {
    fn find_playlist_by_name(
        &self,
        profile: &ProfileAuth,
        name: &str,
    ) -> Result<Option<PlaylistHandle>, ImportError>;

    fn create_playlist(
        &self,
        profile: &ProfileAuth,
        name: &str,
    ) -> Result<PlaylistHandle, ImportError>;

    fn fetch_track_ids(
        &self,
        profile: &ProfileAuth,
        handle: &PlaylistHandle,
    ) -> Result<Vec<String>, ImportError>;

    fn append_tracks(
        &self,
        profile: &ProfileAuth,
        handle: &PlaylistHandle,
        track_ids: &[String],
    ) -> Result<(), ImportError>;
}
