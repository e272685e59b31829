//! Password resolution for the server connection.
//!
//! Order: `--password` flag, then the `TUNELIFT_PASSWORD` environment
//! variable, then the OS keyring entry for the configured profile.

use keyring::Entry;
use log::warn;

use crate::error::ImportError;

const KEYRING_SERVICE_NAME: &str = "tunelift.backend.opensubsonic";
pub const PASSWORD_ENV_VAR: &str = "TUNELIFT_PASSWORD";

fn keyring_entry(profile_id: &str) -> Result<Entry, String> {
    Entry::new(KEYRING_SERVICE_NAME, profile_id)
        .map_err(|err| format!("failed to create keyring entry: {err}"))
}

/// Saves the server password for a profile into the OS keyring.
pub fn store_password(profile_id: &str, password: &str) -> Result<(), String> {
    let entry = keyring_entry(profile_id)?;
    entry
        .set_password(password)
        .map_err(|err| format!("failed to set keyring password: {err}"))
}

/// Loads the server password for a profile from the OS keyring.
pub fn stored_password(profile_id: &str) -> Result<Option<String>, String> {
    let entry = keyring_entry(profile_id)?;
    match entry.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(format!("failed to get keyring password: {err}")),
    }
}

/// An empty or whitespace-only `--password` counts as not given, so
/// resolution falls through to the environment variable and keyring.
fn flag_password(flag_value: Option<&str>) -> Option<&str> {
    flag_value.filter(|value| !value.trim().is_empty())
}

pub fn resolve_password(
    flag_value: Option<&str>,
    profile_id: &str,
) -> Result<String, ImportError> {
    if let Some(password) = flag_password(flag_value) {
        return Ok(password.to_string());
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
        if !password.is_empty() {
            return Ok(password);
        }
    }
    match stored_password(profile_id) {
        Ok(Some(password)) => Ok(password),
        Ok(None) => Err(ImportError::MissingCredentials(profile_id.to_string())),
        Err(err) => {
            warn!("keyring lookup failed for profile '{profile_id}': {err}");
            Err(ImportError::MissingCredentials(profile_id.to_string()))
        }
    }
}
