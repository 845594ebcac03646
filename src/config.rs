//! Configuration management for plcreator.
//!
//! Values come from environment variables, optionally seeded from `.env`
//! files. Lookup order:
//! 1. Environment variables already set (highest priority)
//! 2. `.env` in the local data directory (`<data_local_dir>/plcreator/.env`)
//! 3. `.env` in the current working directory
//! 4. Application defaults (where applicable)

use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    error::{PlaylistError, Result},
    playlists::DEFAULT_MAX_CONCURRENCY,
};

pub const APP_NAME: &str = "plcreator";

pub const SPOTIFY_DEFAULT_APIURL: &str = "https://api.spotify.com/v1";
pub const DEEZER_DEFAULT_APIURL: &str = "https://www.deezer.com/ajax/gw-light.php";

/// Loads environment variables from the `.env` files described in the module docs.
///
/// Creates the application data directory if it doesn't exist yet. Missing
/// `.env` files are not an error; variables that are already set in the
/// process environment are never overridden.
///
/// # Directory Structure
///
/// The data directory `.env` is looked up in:
/// - Linux: `~/.local/share/plcreator/.env`
/// - macOS: `~/Library/Application Support/plcreator/.env`
/// - Windows: `%LOCALAPPDATA%/plcreator/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created, or
/// [`PlaylistError::EnvFile`] if its `.env` cannot be read. The working
/// directory `.env` is still loaded in the latter case.
pub async fn load_env() -> Result<()> {
    load_env_from(&data_dir()).await
}

/// [`load_env`] with the application `.env` looked up in `dir`.
pub async fn load_env_from(dir: &Path) -> Result<()> {
    async_fs::create_dir_all(dir).await?;

    let path = dir.join(".env");
    let loaded = if path.is_file() {
        dotenv::from_path(&path)
            .map(|_| ())
            .map_err(|source| PlaylistError::EnvFile { path, source })
    } else {
        Ok(())
    };

    dotenv::dotenv().ok();
    loaded
}

/// Returns the platform specific data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_NAME);
    path
}

/// Reads the environment variable `name` and parses it as `T`.
///
/// # Errors
///
/// - [`PlaylistError::MissingEnv`] if the variable is not set
/// - [`PlaylistError::InvalidEnv`] if it cannot be parsed as `T`
///
/// # Example
///
/// ```
/// let token: String = config::lookup("SPOTIFY_TOKEN")?;
/// let append: bool = config::lookup("APPEND_RANDOM_NAME")?;
/// ```
pub fn lookup<T>(name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(name).map_err(|_| PlaylistError::MissingEnv(name.to_string()))?;
    raw.trim().parse::<T>().map_err(|e| PlaylistError::InvalidEnv {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Like [`lookup`], falling back to `default` when the variable is not set.
pub fn lookup_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Err(PlaylistError::MissingEnv(_)) => Ok(default),
        other => other,
    }
}

/// Returns the Spotify Web API access token (`SPOTIFY_TOKEN`).
pub fn spotify_token() -> Result<String> {
    lookup("SPOTIFY_TOKEN")
}

/// Returns the Deezer `arl` session cookie (`DEEZER_ARL_COOKIE`).
///
/// The cookie is taken from a browser session logged into deezer.com and
/// should be treated like a password.
pub fn deezer_arl_cookie() -> Result<String> {
    lookup("DEEZER_ARL_COOKIE")
}

/// Whether a random suffix is appended to playlist names (`APPEND_RANDOM_NAME`).
pub fn append_random_name() -> Result<bool> {
    lookup_or("APPEND_RANDOM_NAME", false)
}

/// Maximum number of searches in flight (`PLAYLIST_MAX_CONCURRENCY`, default 100).
pub fn max_concurrency() -> Result<usize> {
    lookup_or("PLAYLIST_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, defaulting to `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| SPOTIFY_DEFAULT_APIURL.to_string())
}

/// Returns the Deezer gateway URL.
///
/// Reads `DEEZER_API_URL`, defaulting to `https://www.deezer.com/ajax/gw-light.php`.
pub fn deezer_apiurl() -> String {
    env::var("DEEZER_API_URL").unwrap_or_else(|_| DEEZER_DEFAULT_APIURL.to_string())
}
