//! Drives one full import run: file → parse → normalize → resolve →
//! reconcile → report.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::backends::{PlaylistStore, ProfileAuth, TrackResolver};
use crate::error::ImportError;
use crate::formats::FormatKind;
use crate::matching::resolve_queries;
use crate::normalize::normalize_records;
use crate::reconcile::{reconcile, ImportCounts, RunOptions};
use crate::song::SkippedEntry;

/// Everything the report renderer needs about one finished run.
#[derive(Debug)]
pub struct ImportReport {
    pub source_file: PathBuf,
    pub playlist_name: String,
    pub dry_run: bool,
    pub created_playlist: bool,
    pub counts: ImportCounts,
    pub to_add: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    /// An append failure does not suppress the report; it is carried here and
    /// turned into a non-zero exit after the report is printed.
    pub append_failure: Option<ImportError>,
}

pub struct ImportManager<'a> {
    resolver: &'a dyn TrackResolver,
    store: &'a dyn PlaylistStore,
}

impl<'a> ImportManager<'a> {
    pub fn new(resolver: &'a dyn TrackResolver, store: &'a dyn PlaylistStore) -> Self {
        Self { resolver, store }
    }

    pub fn run(
        &self,
        profile: &ProfileAuth,
        file_path: &Path,
        playlist_name: &str,
        options: &RunOptions,
    ) -> Result<ImportReport, ImportError> {
        let raw = std::fs::read_to_string(file_path).map_err(|source| {
            ImportError::UnreadableInput {
                path: file_path.to_path_buf(),
                source,
            }
        })?;

        let format = FormatKind::from_path(file_path);
        info!(
            "reading {} as {} playlist",
            file_path.display(),
            format.name()
        );
        let parsed = format.parse(&raw);
        let (queries, normalize_skips) = normalize_records(parsed.records);
        let mut skipped = parsed.skipped;
        skipped.extend(normalize_skips);

        if queries.is_empty() {
            // The run aborts here, so the skip reasons would otherwise
            // never reach the report.
            for entry in &skipped {
                warn!("skipping {} ({})", entry.entry, entry.reason.code());
            }
            return Err(ImportError::EmptyPlaylist {
                path: file_path.to_path_buf(),
                skipped: skipped.len(),
            });
        }
        info!("found {} tracks in playlist file", queries.len());

        let outcomes = resolve_queries(self.resolver, profile, queries)?;
        let result = reconcile(self.store, profile, playlist_name, &outcomes, options)?;
        skipped.extend(result.plan.skipped);

        Ok(ImportReport {
            source_file: file_path.to_path_buf(),
            playlist_name: playlist_name.to_string(),
            dry_run: options.dry_run,
            created_playlist: result.created_playlist,
            counts: result.plan.counts,
            to_add: result.plan.to_add,
            skipped,
            append_failure: result.append_failure,
        })
    }
}
