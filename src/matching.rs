//! Drives the track resolver over normalized song queries.
//!
//! Matching policy: an ISRC-carrying query tries the identifier lookup first
//! and falls back to a text search only when that yields nothing. The first
//! candidate the resolver returns is accepted unconditionally; there is no
//! confidence scoring. Resolver transport failures abort the whole run rather
//! than silently under-importing.

use log::{debug, info};

use crate::backends::{ProfileAuth, TrackCandidate, TrackResolver};
use crate::error::ImportError;
use crate::song::{SkipReason, SongQuery};

/// Per-query resolution result, 1:1 with the input queries and in the same
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Matched {
        query: SongQuery,
        track: TrackCandidate,
    },
    Unmatched {
        query: SongQuery,
        reason: SkipReason,
    },
}

fn resolve_one(
    resolver: &dyn TrackResolver,
    profile: &ProfileAuth,
    query: &SongQuery,
) -> Result<Option<TrackCandidate>, ImportError> {
    if let Some(isrc) = &query.isrc {
        if let Some(candidate) = resolver.find_by_identifier(profile, isrc)? {
            return Ok(Some(candidate));
        }
        debug!("identifier lookup for {isrc} yielded nothing, falling back to text search");
    }
    resolver.search_by_text(profile, &query.title, query.artist.as_deref())
}

/// Resolves every query in input order. One outcome per query, always.
pub fn resolve_queries(
    resolver: &dyn TrackResolver,
    profile: &ProfileAuth,
    queries: Vec<SongQuery>,
) -> Result<Vec<ResolutionOutcome>, ImportError> {
    let total = queries.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, query) in queries.into_iter().enumerate() {
        info!("[{}/{}] searching: {}", index + 1, total, query.display_label());
        let outcome = match resolve_one(resolver, profile, &query)? {
            Some(track) => {
                debug!("matched '{}' -> {}", query.display_label(), track.track_id);
                ResolutionOutcome::Matched { query, track }
            }
            None => ResolutionOutcome::Unmatched {
                query,
                reason: SkipReason::NotFound,
            },
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
