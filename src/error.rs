//! Error types for plcreator.
//!
//! Two layers:
//! - [`ProviderError`]: what a streaming backend reports for a single call
//!   (transport, decoding, service-side messages, bad session).
//! - [`PlaylistError`]: what the gather/push orchestration and the CLI report.
//!   Provider failures are wrapped with the provider name and the phase that
//!   failed, rendering as `{provider}: {phase}: {cause}`.
//!
//! "Track not found" and duplicate tracks are not errors. They travel as data
//! (an empty match list, a rejected [`crate::results::ResultSet::add`]).

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single call against a streaming backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Message reported by the remote service itself.
    #[error("{0}")]
    Api(String),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid session: {0}")]
    Session(String),
}

/// Top-level error type for gather, push and the command-line front end.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("{provider}: setup: {source}")]
    Setup {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("{provider}: searching track {query:?}: {source}")]
    Search {
        provider: String,
        query: String,
        #[source]
        source: ProviderError,
    },

    #[error("no tracks found")]
    NoTracksFound,

    #[error("{provider}: create playlist: {source}")]
    CreatePlaylist {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("{provider}: populate playlist: {source}")]
    PopulatePlaylist {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("search task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("environment variable {0} not found")]
    MissingEnv(String),

    #[error("cannot read '{}': {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    #[error("invalid value for {name}: {reason}")]
    InvalidEnv { name: String, reason: String },

    #[error("no songs found in '{}'", .0.display())]
    EmptyInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaylistError {
    /// Returns true for failures that came back from the streaming backend.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            PlaylistError::Setup { .. }
                | PlaylistError::Search { .. }
                | PlaylistError::CreatePlaylist { .. }
                | PlaylistError::PopulatePlaylist { .. }
        )
    }
}

/// Result type alias for plcreator operations.
pub type Result<T> = std::result::Result<T, PlaylistError>;
