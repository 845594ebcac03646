//! # Spotify Integration Module
//!
//! [`TrackProvider`] implementation backed by the Spotify Web API.
//!
//! The client authenticates with a bearer token supplied by the user
//! (`SPOTIFY_TOKEN`); obtaining or refreshing that token happens outside of
//! plcreator.
//!
//! ## API Coverage
//!
//! - `GET /me` - current user, needed to create playlists on their behalf
//! - `GET /search?type=track` - candidate tracks for a query
//! - `POST /users/{user_id}/playlists` - create a private playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks, 100 per request
//!
//! Tracks are identified by their Spotify URI (`spotify:track:...`), which
//! is what the add-tracks endpoint expects.
//!
//! ## Error Handling
//!
//! Non-success responses carry a `{"error": {"message": ...}}` body whose
//! message is surfaced as [`ProviderError::Api`]. Bodies that don't follow
//! that shape are reported with their status code.

mod playlist;
mod search;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::{
    config,
    error::ProviderError,
    playlists::TrackProvider,
    types::{SpotifyErrorResponse, SpotifyUserResponse, Track},
};

pub const PROVIDER_NAME: &str = "spotify";

/// Per request timeout of the default HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Candidates requested per search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Maximum number of tracks the service accepts in one add-tracks request.
pub const ADD_TRACKS_CHUNK: usize = 100;

pub struct SpotifyClient {
    http: Client,
    base_url: String,
    token: String,
    search_limit: u32,
    user_id: OnceCell<String>,
}

impl SpotifyClient {
    /// Creates a client against the configured API URL (`SPOTIFY_API_URL`).
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_base_url(http, config::spotify_apiurl(), token))
    }

    pub fn with_base_url(
        http: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            user_id: OnceCell::new(),
        }
    }

    /// Number of candidates requested per search (1-50).
    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit.clamp(1, 50);
        self
    }

    /// Returns the id of the user owning the token.
    pub async fn me(&self) -> Result<String, ProviderError> {
        let response = self.get("/me").send().await?;
        let user: SpotifyUserResponse = read_json(response, StatusCode::OK).await?;
        Ok(user.id)
    }

    async fn user_id(&self) -> Result<&str, ProviderError> {
        let id = self.user_id.get_or_try_init(|| self.me()).await?;
        Ok(id.as_str())
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(format!("{}{}", self.base_url, path)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

#[async_trait]
impl TrackProvider for SpotifyClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn setup(&self) -> Result<(), ProviderError> {
        let user = self.user_id().await?;
        tracing::debug!(user, "Spotify user resolved");
        Ok(())
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, ProviderError> {
        self.search(query).await
    }

    async fn create_playlist(&self, name: &str) -> Result<String, ProviderError> {
        self.create(name).await
    }

    async fn populate_playlist(
        &self,
        playlist_id: &str,
        tracks: &[String],
    ) -> Result<(), ProviderError> {
        self.add_tracks(playlist_id, tracks).await
    }
}

/// Decodes `response` as `T` if it carries the `expected` status.
async fn read_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> Result<T, ProviderError> {
    let body = read_body(response, expected).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Returns the raw body of `response`, or the error it describes.
async fn read_body(response: Response, expected: StatusCode) -> Result<Vec<u8>, ProviderError> {
    let status = response.status();
    let body = response.bytes().await?;

    if status != expected {
        return Err(parse_error(status, &body));
    }

    Ok(body.to_vec())
}

fn parse_error(status: StatusCode, body: &[u8]) -> ProviderError {
    match serde_json::from_slice::<SpotifyErrorResponse>(body) {
        Ok(er) => ProviderError::Api(er.error.message),
        Err(_) => ProviderError::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}
