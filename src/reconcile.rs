//! Reconciles resolved tracks against the current remote playlist state.
//!
//! Produces the run's action plan: which track ids to append, which entries
//! to skip and why, and the counts for the final report. Mutation only
//! happens here, and never in a dry run.

use std::collections::HashSet;

use log::{debug, info};

use crate::backends::{PlaylistHandle, PlaylistStore, ProfileAuth};
use crate::error::ImportError;
use crate::matching::ResolutionOutcome;
use crate::song::{SkipReason, SkippedEntry};

/// Per-run behavior switches, set from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub create_if_missing: bool,
    pub skip_duplicates: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub matched: usize,
    pub unmatched: usize,
    pub skipped_duplicate: usize,
    pub added: usize,
}

/// The computed additions and skips for one run, prior to execution.
#[derive(Debug, Default, PartialEq)]
pub struct ActionPlan {
    pub to_add: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    pub counts: ImportCounts,
}

/// Result of one reconciliation pass, including whether the target playlist
/// was (or would be) created and whether the append failed.
#[derive(Debug)]
pub struct ReconciliationResult {
    pub plan: ActionPlan,
    pub created_playlist: bool,
    pub playlist: Option<PlaylistHandle>,
    pub append_failure: Option<ImportError>,
}

/// Pure planning step: walks the outcomes in order, deduplicating against the
/// snapshot and against earlier additions in the same run when
/// `skip_duplicates` is set. Unmatched outcomes always land in `skipped`.
pub fn build_action_plan(
    outcomes: &[ResolutionOutcome],
    snapshot: &[String],
    skip_duplicates: bool,
) -> ActionPlan {
    let mut plan = ActionPlan::default();
    let mut present: HashSet<&str> = snapshot.iter().map(String::as_str).collect();

    for outcome in outcomes {
        match outcome {
            ResolutionOutcome::Matched { query, track } => {
                plan.counts.matched += 1;
                if skip_duplicates && present.contains(track.track_id.as_str()) {
                    plan.counts.skipped_duplicate += 1;
                    plan.skipped
                        .push(SkippedEntry::new(query.display_label(), SkipReason::Duplicate));
                    continue;
                }
                present.insert(track.track_id.as_str());
                plan.to_add.push(track.track_id.clone());
            }
            ResolutionOutcome::Unmatched { query, reason } => {
                plan.counts.unmatched += 1;
                plan.skipped
                    .push(SkippedEntry::new(query.display_label(), *reason));
            }
        }
    }
    plan.counts.added = plan.to_add.len();
    plan
}

/// Looks up (or creates) the target playlist, builds the action plan against
/// its snapshot, and executes the append unless this is a dry run.
pub fn reconcile(
    store: &dyn PlaylistStore,
    profile: &ProfileAuth,
    playlist_name: &str,
    outcomes: &[ResolutionOutcome],
    options: &RunOptions,
) -> Result<ReconciliationResult, ImportError> {
    let existing = store.find_playlist_by_name(profile, playlist_name)?;

    let (playlist, created_playlist, snapshot) = match existing {
        Some(handle) => {
            debug!("found playlist '{}' ({})", handle.name, handle.playlist_id);
            let snapshot = store.fetch_track_ids(profile, &handle)?;
            (Some(handle), false, snapshot)
        }
        None if !options.create_if_missing => {
            return Err(ImportError::PlaylistNotFound(playlist_name.to_string()));
        }
        None if options.dry_run => {
            info!("playlist '{playlist_name}' not found, would create it");
            (None, true, Vec::new())
        }
        None => {
            info!("playlist '{playlist_name}' not found, creating it");
            let handle = store.create_playlist(profile, playlist_name)?;
            (Some(handle), true, Vec::new())
        }
    };

    let plan = build_action_plan(outcomes, &snapshot, options.skip_duplicates);

    let mut append_failure = None;
    if !options.dry_run && !plan.to_add.is_empty() {
        let handle = playlist
            .as_ref()
            .expect("non-dry-run reconciliation always has a playlist handle");
        if let Err(err) = store.append_tracks(profile, handle, &plan.to_add) {
            append_failure = Some(err);
        }
    }

    Ok(ReconciliationResult {
        plan,
        created_playlist,
        playlist,
        append_failure,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::{build_action_plan, reconcile, RunOptions};
    use crate::backends::{PlaylistHandle, PlaylistStore, ProfileAuth, TrackCandidate};
    use crate::error::ImportError;
    use crate::matching::ResolutionOutcome;
    use crate::song::{SkipReason, SongQuery};

    fn profile() -> ProfileAuth {
        ProfileAuth {
            profile_id: "test".to_string(),
            endpoint: "https://music.example.com".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    }

    fn matched(title: &str, track_id: &str) -> ResolutionOutcome {
        ResolutionOutcome::Matched {
            query: SongQuery {
                title: title.to_string(),
                artist: None,
                album: None,
                isrc: None,
            },
            track: TrackCandidate {
                track_id: track_id.to_string(),
                artist: "Tom Waits".to_string(),
                title: title.to_string(),
            },
        }
    }

    fn unmatched(title: &str) -> ResolutionOutcome {
        ResolutionOutcome::Unmatched {
            query: SongQuery {
                title: title.to_string(),
                artist: None,
                album: None,
                isrc: None,
            },
            reason: SkipReason::NotFound,
        }
    }

    /// In-memory playlist store tracking every mutation call.
    #[derive(Default)]
    struct FakeStore {
        playlists: RefCell<HashMap<String, Vec<String>>>,
        append_calls: RefCell<usize>,
        create_calls: RefCell<usize>,
        fail_append: Cell<bool>,
    }

    impl FakeStore {
        fn with_playlist(name: &str, tracks: &[&str]) -> Self {
            let store = Self::default();
            store.playlists.borrow_mut().insert(
                name.to_string(),
                tracks.iter().map(|id| id.to_string()).collect(),
            );
            store
        }
    }

    impl PlaylistStore for FakeStore {
        fn find_playlist_by_name(
            &self,
            _profile: &ProfileAuth,
            name: &str,
        ) -> Result<Option<PlaylistHandle>, ImportError> {
            Ok(self
                .playlists
                .borrow()
                .contains_key(name)
                .then(|| PlaylistHandle {
                    playlist_id: format!("id-{name}"),
                    name: name.to_string(),
                }))
        }

        fn create_playlist(
            &self,
            _profile: &ProfileAuth,
            name: &str,
        ) -> Result<PlaylistHandle, ImportError> {
            *self.create_calls.borrow_mut() += 1;
            self.playlists
                .borrow_mut()
                .insert(name.to_string(), Vec::new());
            Ok(PlaylistHandle {
                playlist_id: format!("id-{name}"),
                name: name.to_string(),
            })
        }

        fn fetch_track_ids(
            &self,
            _profile: &ProfileAuth,
            handle: &PlaylistHandle,
        ) -> Result<Vec<String>, ImportError> {
            Ok(self
                .playlists
                .borrow()
                .get(&handle.name)
                .cloned()
                .unwrap_or_default())
        }

        fn append_tracks(
            &self,
            _profile: &ProfileAuth,
            handle: &PlaylistHandle,
            track_ids: &[String],
        ) -> Result<(), ImportError> {
            *self.append_calls.borrow_mut() += 1;
            if self.fail_append.get() {
                return Err(ImportError::PartialAppend {
                    added: 0,
                    requested: track_ids.len(),
                    message: "server rejected the update".to_string(),
                });
            }
            self.playlists
                .borrow_mut()
                .entry(handle.name.clone())
                .or_default()
                .extend(track_ids.iter().cloned());
            Ok(())
        }
    }

    #[test]
    fn test_snapshot_duplicate_is_skipped_not_added() {
        let outcomes = vec![matched("Alice", "t1"), matched("November", "t2")];
        let plan = build_action_plan(&outcomes, &["t1".to_string()], true);
        assert_eq!(plan.to_add, vec!["t2".to_string()]);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].reason, SkipReason::Duplicate);
        assert_eq!(plan.counts.skipped_duplicate, 1);
        assert_eq!(plan.counts.added, 1);
    }

    #[test]
    fn test_within_run_duplicate_is_skipped() {
        let outcomes = vec![matched("Alice", "t1"), matched("Alice", "t1")];
        let plan = build_action_plan(&outcomes, &[], true);
        assert_eq!(plan.to_add, vec!["t1".to_string()]);
        assert_eq!(plan.counts.skipped_duplicate, 1);
    }

    #[test]
    fn test_duplicates_are_kept_when_skip_duplicates_is_off() {
        let outcomes = vec![matched("Alice", "t1"), matched("Alice", "t1")];
        let plan = build_action_plan(&outcomes, &["t1".to_string()], false);
        assert_eq!(plan.to_add, vec!["t1".to_string(), "t1".to_string()]);
        assert_eq!(plan.counts.skipped_duplicate, 0);
    }

    #[test]
    fn test_unmatched_entries_are_recorded_and_counts_balance() {
        let outcomes = vec![
            matched("Alice", "t1"),
            unmatched("Nowhere"),
            matched("November", "t2"),
            matched("Alice", "t1"),
        ];
        let plan = build_action_plan(&outcomes, &[], true);
        assert_eq!(
            plan.counts.added + plan.counts.skipped_duplicate + plan.counts.unmatched,
            outcomes.len()
        );
        assert_eq!(plan.counts.unmatched, 1);
        assert_eq!(plan.skipped[0].reason, SkipReason::NotFound);
    }

    #[test]
    fn test_missing_playlist_without_create_flag_is_fatal() {
        let store = FakeStore::default();
        let result = reconcile(
            &store,
            &profile(),
            "mix",
            &[matched("Alice", "t1")],
            &RunOptions::default(),
        );
        assert!(matches!(result, Err(ImportError::PlaylistNotFound(_))));
        assert_eq!(*store.append_calls.borrow(), 0);
    }

    #[test]
    fn test_missing_playlist_is_created_when_requested() {
        let store = FakeStore::default();
        let options = RunOptions {
            create_if_missing: true,
            ..RunOptions::default()
        };
        let result = reconcile(
            &store,
            &profile(),
            "mix",
            &[matched("Alice", "t1")],
            &options,
        )
        .unwrap();
        assert!(result.created_playlist);
        assert_eq!(*store.create_calls.borrow(), 1);
        assert_eq!(
            store.playlists.borrow().get("mix").unwrap(),
            &vec!["t1".to_string()]
        );
    }

    #[test]
    fn test_dry_run_never_mutates_but_plans_identically() {
        let outcomes = vec![
            matched("Alice", "t1"),
            matched("November", "t2"),
            unmatched("Nowhere"),
        ];
        let options = RunOptions {
            skip_duplicates: true,
            ..RunOptions::default()
        };

        let dry_store = FakeStore::with_playlist("mix", &["t1"]);
        let dry = reconcile(
            &dry_store,
            &profile(),
            "mix",
            &outcomes,
            &RunOptions {
                dry_run: true,
                ..options
            },
        )
        .unwrap();
        assert_eq!(*dry_store.append_calls.borrow(), 0);

        let real_store = FakeStore::with_playlist("mix", &["t1"]);
        let real = reconcile(&real_store, &profile(), "mix", &outcomes, &options).unwrap();
        assert_eq!(*real_store.append_calls.borrow(), 1);

        assert_eq!(dry.plan, real.plan);
        assert_eq!(dry.plan.counts.added, 1);
    }

    #[test]
    fn test_dry_run_records_intended_create_without_calling_store() {
        let store = FakeStore::default();
        let options = RunOptions {
            create_if_missing: true,
            dry_run: true,
            ..RunOptions::default()
        };
        let result = reconcile(
            &store,
            &profile(),
            "mix",
            &[matched("Alice", "t1")],
            &options,
        )
        .unwrap();
        assert!(result.created_playlist);
        assert!(result.playlist.is_none());
        assert_eq!(*store.create_calls.borrow(), 0);
    }

    #[test]
    fn test_append_failure_is_carried_without_losing_the_plan() {
        let store = FakeStore::with_playlist("mix", &[]);
        store.fail_append.set(true);
        let outcomes = vec![
            matched("Alice", "t1"),
            matched("November", "t2"),
            unmatched("Nowhere"),
        ];
        let result = reconcile(
            &store,
            &profile(),
            "mix",
            &outcomes,
            &RunOptions::default(),
        )
        .unwrap();

        assert_eq!(result.plan.to_add, vec!["t1".to_string(), "t2".to_string()]);
        assert_eq!(result.plan.counts.added, 2);
        assert_eq!(result.plan.skipped.len(), 1);
        assert!(matches!(
            result.append_failure,
            Some(ImportError::PartialAppend {
                added: 0,
                requested: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_second_run_with_skip_duplicates_adds_nothing() {
        let store = FakeStore::with_playlist("mix", &[]);
        let outcomes = vec![matched("Alice", "t1"), matched("November", "t2")];
        let options = RunOptions {
            skip_duplicates: true,
            ..RunOptions::default()
        };

        let first = reconcile(&store, &profile(), "mix", &outcomes, &options).unwrap();
        assert_eq!(first.plan.counts.added, 2);

        let second = reconcile(&store, &profile(), "mix", &outcomes, &options).unwrap();
        assert_eq!(second.plan.counts.added, 0);
        assert_eq!(second.plan.counts.skipped_duplicate, 2);
    }
}
