//! Playlist Creator Library
//!
//! Turns a list of free-text song queries into a playlist on a streaming
//! service. Queries are searched concurrently, each one's candidates are
//! handed to the caller, the chosen tracks are deduplicated by identity, and
//! the resulting ordered list is pushed to the service as a new playlist.
//!
//! # Modules
//!
//! - `cli` - Command-line front end
//! - `config` - Configuration from environment variables and `.env` files
//! - `deezer` - Deezer gateway provider
//! - `error` - Error types
//! - `logs` - Diagnostic logging to a file
//! - `playlists` - Provider trait and gather/push orchestration
//! - `results` - Ordered, duplicate-free result set
//! - `spotify` - Spotify Web API provider
//! - `types` - Data structures and wire types
//! - `utils` - Small helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use plcreator::{playlists::Manager, results::ResultSet, spotify::SpotifyClient};
//! use tokio_util::sync::CancellationToken;
//!
//! let provider = Arc::new(SpotifyClient::new(token)?);
//! let manager = Manager::new(provider, 100);
//! let cancel = CancellationToken::new();
//!
//! let results = Arc::new(ResultSet::new(queries.len()));
//! let sink = Arc::clone(&results);
//! manager
//!     .gather(&cancel, queries, move |slot, _query, matches| {
//!         if let Some(track) = matches.first() {
//!             sink.add(slot, &track.id);
//!         }
//!     })
//!     .await?;
//!
//! manager.push(&cancel, "My playlist", &results.slice()).await?;
//! ```

pub mod cli;
pub mod config;
pub mod deezer;
pub mod error;
pub mod logs;
pub mod playlists;
pub mod results;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Searching {} songs on {}", count, provider);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark to stderr and exits
/// the program with status 1.
///
/// Only meant for the binary's top level, after everything that needs
/// cleanup has been dropped.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark to stderr.
///
/// Used for conditions the user should notice but that don't stop the run,
/// such as a song that could not be found or a duplicated track.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
