use reqwest::StatusCode;

use super::{ADD_TRACKS_CHUNK, SpotifyClient, read_body, read_json};
use crate::{
    error::ProviderError,
    types::{AddTracksRequest, CreatePlaylistRequest, CreatePlaylistResponse},
};

impl SpotifyClient {
    /// Creates a private playlist owned by the token's user and returns its id.
    pub async fn create(&self, name: &str) -> Result<String, ProviderError> {
        let user_id = self.user_id().await?;

        let body = CreatePlaylistRequest {
            name: name.to_string(),
            public: false,
        };

        let response = self
            .post(&format!("/users/{}/playlists", user_id))
            .json(&body)
            .send()
            .await?;

        let playlist: CreatePlaylistResponse = read_json(response, StatusCode::CREATED).await?;
        Ok(playlist.id)
    }

    /// Appends `uris` to the playlist, in order.
    ///
    /// The service accepts at most 100 tracks per request, so larger lists are
    /// sent in consecutive chunks. A failing chunk stops the upload; chunks
    /// already sent stay in the playlist.
    pub async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ProviderError> {
        for chunk in uris.chunks(ADD_TRACKS_CHUNK) {
            let body = AddTracksRequest {
                uris: chunk.to_vec(),
            };

            let response = self
                .post(&format!("/playlists/{}/tracks", playlist_id))
                .json(&body)
                .send()
                .await?;

            read_body(response, StatusCode::CREATED).await?;
        }

        Ok(())
    }
}
