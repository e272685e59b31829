//! OpenSubsonic backend implementing the resolver and playlist-store
//! capabilities over the Subsonic REST protocol.

use std::time::Duration;

use serde_json::Value;

use crate::backends::{PlaylistHandle, PlaylistStore, ProfileAuth, TrackCandidate, TrackResolver};
use crate::error::ImportError;

const API_VERSION: &str = "1.16.1";
const CLIENT_ID: &str = "tunelift";

/// `updatePlaylist` request size cap; large imports are appended in chunks.
const MAX_APPEND_BATCH: usize = 100;

/// OpenSubsonic adapter backed by `ureq`.
pub struct OpenSubsonicBackend {
    http_client: ureq::Agent,
}

impl OpenSubsonicBackend {
    /// Creates a new OpenSubsonic backend.
    pub fn new() -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();
        Self { http_client }
    }

    fn make_salt() -> String {
        let mut bytes = [0u8; 8];
        let _ = getrandom::fill(&mut bytes);
        bytes.iter().map(|value| format!("{value:02x}")).collect()
    }

    fn auth_params(profile: &ProfileAuth) -> Vec<(String, String)> {
        let salt = Self::make_salt();
        let token = format!(
            "{:x}",
            md5::compute(format!("{}{}", profile.password, salt))
        );
        vec![
            ("u".to_string(), profile.username.clone()),
            ("t".to_string(), token),
            ("s".to_string(), salt),
            ("f".to_string(), "json".to_string()),
            ("v".to_string(), API_VERSION.to_string()),
            ("c".to_string(), CLIENT_ID.to_string()),
        ]
    }

    fn endpoint_base(endpoint: &str) -> String {
        endpoint.trim().trim_end_matches('/').to_string()
    }

    fn api_url(profile: &ProfileAuth, method: &str, params: &[(String, String)]) -> String {
        let mut query_parts: Vec<String> = Self::auth_params(profile)
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect();
        query_parts.extend(
            params
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value))),
        );
        format!(
            "{}/rest/{}.view?{}",
            Self::endpoint_base(&profile.endpoint),
            method,
            query_parts.join("&")
        )
    }

    fn request_json(
        &self,
        profile: &ProfileAuth,
        method: &str,
        params: &[(String, String)],
    ) -> Result<Value, String> {
        let url = Self::api_url(profile, method, params);
        let response = self
            .http_client
            .get(&url)
            .call()
            .map_err(|err| format!("OpenSubsonic request failed ({method}): {err}"))?;
        let parsed: Value = response
            .into_json()
            .map_err(|err| format!("OpenSubsonic response parse failed ({method}): {err}"))?;
        let status = parsed
            .get("subsonic-response")
            .and_then(|value| value.get("status"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if status != "ok" {
            let error_message = parsed
                .get("subsonic-response")
                .and_then(|value| value.get("error"))
                .and_then(|value| value.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("OpenSubsonic returned an error");
            return Err(error_message.to_string());
        }
        Ok(parsed)
    }

    fn array_or_single(value: Option<&Value>) -> Vec<&Value> {
        match value {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(item @ Value::Object(_)) => vec![item],
            _ => Vec::new(),
        }
    }

    fn parse_candidate(song: &Value) -> Option<TrackCandidate> {
        let track_id = song.get("id")?.as_str()?.to_string();
        let title = song
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Title")
            .to_string();
        let artist = song
            .get("artist")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Artist")
            .to_string();
        Some(TrackCandidate {
            track_id,
            artist,
            title,
        })
    }

    /// Runs a `search3` text query and returns the first song hit, if any.
    fn search_first_song(
        &self,
        profile: &ProfileAuth,
        query: &str,
    ) -> Result<Option<TrackCandidate>, String> {
        let payload = self.request_json(
            profile,
            "search3",
            &[
                ("query".to_string(), query.to_string()),
                ("songCount".to_string(), "1".to_string()),
                ("artistCount".to_string(), "0".to_string()),
                ("albumCount".to_string(), "0".to_string()),
            ],
        )?;
        let songs = Self::array_or_single(
            payload
                .get("subsonic-response")
                .and_then(|value| value.get("searchResult3"))
                .and_then(|value| value.get("song")),
        );
        Ok(songs.first().and_then(|song| Self::parse_candidate(song)))
    }

    fn fetch_playlist_entry_ids(
        &self,
        profile: &ProfileAuth,
        playlist_id: &str,
    ) -> Result<Vec<String>, String> {
        let payload = self.request_json(
            profile,
            "getPlaylist",
            &[("id".to_string(), playlist_id.to_string())],
        )?;
        let entries = Self::array_or_single(
            payload
                .get("subsonic-response")
                .and_then(|value| value.get("playlist"))
                .and_then(|value| value.get("entry")),
        );
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .get("id")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned)
            })
            .collect())
    }

    fn append_batch(
        &self,
        profile: &ProfileAuth,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), String> {
        let mut params = vec![("playlistId".to_string(), playlist_id.to_string())];
        for track_id in track_ids {
            params.push(("songIdToAdd".to_string(), track_id.clone()));
        }
        let _ = self.request_json(profile, "updatePlaylist", &params)?;
        Ok(())
    }
}

impl Default for OpenSubsonicBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackResolver for OpenSubsonicBackend {
    fn find_by_identifier(
        &self,
        profile: &ProfileAuth,
        isrc: &str,
    ) -> Result<Option<TrackCandidate>, ImportError> {
        // The protocol has no dedicated identifier endpoint; servers that
        // index tag-level ISRCs answer a plain search3 for the code.
        self.search_first_song(profile, isrc)
            .map_err(ImportError::ResolverUnavailable)
    }

    fn search_by_text(
        &self,
        profile: &ProfileAuth,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<TrackCandidate>, ImportError> {
        let query = match artist {
            Some(artist) => format!("{artist} {title}"),
            None => title.to_string(),
        };
        self.search_first_song(profile, &query)
            .map_err(ImportError::ResolverUnavailable)
    }
}

impl PlaylistStore for OpenSubsonicBackend {
    fn find_playlist_by_name(
        &self,
        profile: &ProfileAuth,
        name: &str,
    ) -> Result<Option<PlaylistHandle>, ImportError> {
        let payload = self
            .request_json(profile, "getPlaylists", &[])
            .map_err(ImportError::StoreUnavailable)?;
        let playlists = Self::array_or_single(
            payload
                .get("subsonic-response")
                .and_then(|value| value.get("playlists"))
                .and_then(|value| value.get("playlist")),
        );

        let wanted = name.to_lowercase();
        for playlist in playlists {
            let Some(playlist_id) = playlist
                .get("id")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
            else {
                continue;
            };
            let Some(playlist_name) = playlist.get("name").and_then(Value::as_str) else {
                continue;
            };
            if playlist_name.to_lowercase() == wanted {
                return Ok(Some(PlaylistHandle {
                    playlist_id,
                    name: playlist_name.to_string(),
                }));
            }
        }
        Ok(None)
    }

    fn create_playlist(
        &self,
        profile: &ProfileAuth,
        name: &str,
    ) -> Result<PlaylistHandle, ImportError> {
        let trimmed_name = name.trim();
        if trimmed_name.is_empty() {
            return Err(ImportError::StoreUnavailable(
                "playlist name cannot be empty".to_string(),
            ));
        }
        let payload = self
            .request_json(
                profile,
                "createPlaylist",
                &[("name".to_string(), trimmed_name.to_string())],
            )
            .map_err(ImportError::StoreUnavailable)?;
        payload
            .get("subsonic-response")
            .and_then(|value| value.get("playlist"))
            .and_then(|value| value.get("id"))
            .and_then(Value::as_str)
            .map(|playlist_id| PlaylistHandle {
                playlist_id: playlist_id.to_string(),
                name: trimmed_name.to_string(),
            })
            .ok_or_else(|| {
                ImportError::StoreUnavailable(
                    "OpenSubsonic createPlaylist response missing playlist id".to_string(),
                )
            })
    }

    fn fetch_track_ids(
        &self,
        profile: &ProfileAuth,
        handle: &PlaylistHandle,
    ) -> Result<Vec<String>, ImportError> {
        self.fetch_playlist_entry_ids(profile, &handle.playlist_id)
            .map_err(ImportError::StoreUnavailable)
    }

    fn append_tracks(
        &self,
        profile: &ProfileAuth,
        handle: &PlaylistHandle,
        track_ids: &[String],
    ) -> Result<(), ImportError> {
        let mut appended = 0usize;
        for batch in track_ids.chunks(MAX_APPEND_BATCH) {
            if let Err(message) = self.append_batch(profile, &handle.playlist_id, batch) {
                return Err(ImportError::PartialAppend {
                    added: appended,
                    requested: track_ids.len(),
                    message,
                });
            }
            appended += batch.len();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::OpenSubsonicBackend;
    use crate::backends::ProfileAuth;

    fn profile() -> ProfileAuth {
        ProfileAuth {
            profile_id: "default".to_string(),
            endpoint: "https://music.example.com/".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_api_url_trims_endpoint_and_encodes_params() {
        let url = OpenSubsonicBackend::api_url(
            &profile(),
            "search3",
            &[("query".to_string(), "Tom Waits Alice".to_string())],
        );
        assert!(url.starts_with("https://music.example.com/rest/search3.view?"));
        assert!(url.contains("u=alice"));
        assert!(url.contains("query=Tom%20Waits%20Alice"));
        assert!(url.contains("c=tunelift"));
    }

    #[test]
    fn test_parse_candidate_requires_id_and_defaults_text_fields() {
        let song = json!({"id": "t1"});
        let candidate = OpenSubsonicBackend::parse_candidate(&song).unwrap();
        assert_eq!(candidate.track_id, "t1");
        assert_eq!(candidate.title, "Unknown Title");
        assert_eq!(candidate.artist, "Unknown Artist");

        assert!(OpenSubsonicBackend::parse_candidate(&json!({"title": "Alice"})).is_none());
    }

    #[test]
    fn test_array_or_single_tolerates_both_shapes() {
        let single = json!({"id": "t1"});
        assert_eq!(OpenSubsonicBackend::array_or_single(Some(&single)).len(), 1);
        let many = json!([{"id": "t1"}, {"id": "t2"}]);
        assert_eq!(OpenSubsonicBackend::array_or_single(Some(&many)).len(), 2);
        assert!(OpenSubsonicBackend::array_or_single(None).is_empty());
    }
}
