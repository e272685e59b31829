mod backends;
mod config;
mod credentials;
mod error;
mod formats;
mod import_manager;
mod matching;
mod normalize;
mod reconcile;
mod report;
mod song;

use std::path::PathBuf;

use anyhow::{bail, Result};
use backends::{opensubsonic::OpenSubsonicBackend, ProfileAuth};
use clap::Parser;
use import_manager::ImportManager;
use log::warn;
use reconcile::RunOptions;

/// Imports a playlist file (CSV, M3U/M3U8, or free text) into a named
/// playlist on an OpenSubsonic-compatible server.
#[derive(Parser, Debug)]
#[clap(name = "tunelift", version)]
struct CliArgs {
    /// Path to the playlist file (.csv, .m3u, .m3u8, or free text).
    playlist_file: PathBuf,

    /// Name of the remote playlist to add tracks to.
    playlist_name: String,

    /// Server base URL, e.g. https://music.example.com (overrides config).
    #[clap(long)]
    endpoint: Option<String>,

    /// Server account user name (overrides config).
    #[clap(long)]
    username: Option<String>,

    /// Server password. Prefer TUNELIFT_PASSWORD or a keyring-stored password.
    #[clap(long)]
    password: Option<String>,

    /// Store the password given with --password in the OS keyring.
    #[clap(long)]
    save_password: bool,

    /// Create the remote playlist if it does not exist.
    #[clap(long)]
    create_playlist: bool,

    /// Skip tracks already present in the remote playlist.
    #[clap(long)]
    skip_duplicates: bool,

    /// Plan and report only; never mutate the remote playlist.
    #[clap(long)]
    dry_run: bool,

    /// Path to the config file (default: <config dir>/tunelift/config.toml).
    #[clap(long)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[clap(short, long)]
    verbose: bool,
}

fn pick(flag: Option<String>, config_value: String) -> String {
    match flag {
        Some(value) if !value.trim().is_empty() => value,
        _ => config_value,
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    let config = config::load_config(args.config.as_deref())?;

    let endpoint = pick(args.endpoint, config.connection.endpoint);
    if endpoint.trim().is_empty() {
        bail!("no server endpoint configured; pass --endpoint or set [connection].endpoint in the config file");
    }
    let username = pick(args.username, config.connection.username);
    if username.trim().is_empty() {
        bail!("no user name configured; pass --username or set [connection].username in the config file");
    }

    let profile_id = config.connection.profile_id;
    let password = credentials::resolve_password(args.password.as_deref(), &profile_id)?;
    if args.save_password {
        match args.password.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(password) => {
                if let Err(err) = credentials::store_password(&profile_id, password) {
                    warn!("failed to store password in keyring: {err}");
                }
            }
            None => warn!("--save-password requires --password; nothing stored"),
        }
    }

    let profile = ProfileAuth {
        profile_id,
        endpoint,
        username,
        password,
    };
    let options = RunOptions {
        create_if_missing: args.create_playlist || config.import.create_if_missing,
        skip_duplicates: args.skip_duplicates || config.import.skip_duplicates,
        dry_run: args.dry_run,
    };

    let backend = OpenSubsonicBackend::new();
    let manager = ImportManager::new(&backend, &backend);
    let run_report = manager.run(&profile, &args.playlist_file, &args.playlist_name, &options)?;

    print!("{}", report::render(&run_report));

    if let Some(failure) = run_report.append_failure {
        bail!(failure);
    }
    Ok(())
}
