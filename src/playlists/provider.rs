use async_trait::async_trait;

use crate::{error::ProviderError, types::Track};

/// A streaming backend able to resolve queries and build playlists.
///
/// Implementations are shared between concurrently running search tasks, so
/// every method takes `&self` and the type must be `Send + Sync`.
///
/// Cancellation is handled by the caller dropping the returned future; an
/// implementation should not hold state that would be left inconsistent by
/// that (e.g. a half-updated token cache).
#[async_trait]
pub trait TrackProvider: Send + Sync {
    /// Stable identifier used to prefix error messages, e.g. `"spotify"`.
    fn name(&self) -> &str;

    /// One-time handshake run before any search (token or user lookup).
    async fn setup(&self) -> Result<(), ProviderError>;

    /// Returns every candidate for `query`.
    ///
    /// Nothing found is an empty vector, never an error.
    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, ProviderError>;

    /// Creates an empty playlist and returns its id.
    async fn create_playlist(&self, name: &str) -> Result<String, ProviderError>;

    /// Appends `tracks`, in order, to the playlist `playlist_id`.
    async fn populate_playlist(
        &self,
        playlist_id: &str,
        tracks: &[String],
    ) -> Result<(), ProviderError>;
}
