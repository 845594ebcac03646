//! # Deezer Integration Module
//!
//! [`TrackProvider`] implementation backed by Deezer's private web gateway
//! (`gw-light.php`), the same endpoint the deezer.com web player talks to.
//!
//! ## Session
//!
//! Requests are authenticated with the `arl` cookie of a logged-in browser
//! session. A CSRF token (`checkForm`) is obtained once through
//! `deezer.getUserData` and sent as `api_token` on every later call. Cookies
//! set by the gateway are kept in a small jar and replayed on each request.
//!
//! ## Gateway Methods
//!
//! - `deezer.getUserData` - session check and CSRF token
//! - `deezer.pageSearch` - candidate tracks for a query
//! - `playlist.create` - create a playlist, returns its numeric id
//! - `playlist.addSongs` - append songs with their position
//!
//! Every response is wrapped in an `{"error": ..., "results": ...}` envelope;
//! see [`envelope_error`] for how errors are extracted.

mod envelope;

use std::{collections::BTreeMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{CACHE_CONTROL, COOKIE, SET_COOKIE},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

pub use envelope::{envelope_error, uncapitalize};

use crate::{
    config,
    error::ProviderError,
    playlists::TrackProvider,
    types::{DeezerEnvelope, DeezerSearchResults, DeezerUserData, Track},
    utils,
};

pub const PROVIDER_NAME: &str = "deezer";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Candidates kept per search.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

pub struct DeezerClient {
    http: Client,
    api_url: String,
    search_limit: usize,
    jar: Mutex<BTreeMap<String, String>>,
    token: OnceCell<String>,
}

impl DeezerClient {
    /// Creates a client against the configured gateway (`DEEZER_API_URL`).
    pub fn new(arl: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_api_url(http, config::deezer_apiurl(), arl))
    }

    pub fn with_api_url(http: Client, api_url: impl Into<String>, arl: impl Into<String>) -> Self {
        let mut jar = BTreeMap::new();
        jar.insert("arl".to_string(), arl.into());

        Self {
            http,
            api_url: api_url.into(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            jar: Mutex::new(jar),
            token: OnceCell::new(),
        }
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Checks the `arl` cookie and returns a fresh CSRF token.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Session`] when the cookie doesn't belong to a
    /// logged-in user.
    pub async fn fetch_token(&self) -> Result<String, ProviderError> {
        let data: DeezerUserData = self.send("", "deezer.getUserData", &Value::Null).await?;

        if !valid_id(&data.user.id) {
            return Err(ProviderError::Session("invalid arl cookie".to_string()));
        }

        Ok(data.check_form)
    }

    async fn token(&self) -> Result<&str, ProviderError> {
        let token = self.token.get_or_try_init(|| self.fetch_token()).await?;
        Ok(token.as_str())
    }

    /// Searches the catalog for songs matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Track>, ProviderError> {
        let token = self.token().await?;

        let res: DeezerSearchResults = self
            .send(token, "deezer.pageSearch", &json!({ "query": query }))
            .await?;

        let tracks = res
            .track
            .data
            .into_iter()
            .filter(|song| valid_id(&song.id))
            .take(self.search_limit)
            .map(|song| {
                let name = utils::display_name(&[song.artist.as_str()], &song.title, &song.album);
                Track::new(song.id, name)
            })
            .collect();

        Ok(tracks)
    }

    /// Creates a playlist titled `title` and returns its id.
    pub async fn create(&self, title: &str) -> Result<String, ProviderError> {
        let token = self.token().await?;

        let id: Value = self
            .send(token, "playlist.create", &json!({ "title": title }))
            .await?;

        let id = match id {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            _ => String::new(),
        };

        if !valid_id(&id) {
            return Err(ProviderError::Api("failed to create playlist".to_string()));
        }

        Ok(id)
    }

    /// Appends `songs` to the playlist, keeping their order.
    pub async fn add_songs(&self, playlist_id: &str, songs: &[String]) -> Result<(), ProviderError> {
        let token = self.token().await?;

        let songs: Vec<Value> = songs
            .iter()
            .enumerate()
            .map(|(position, id)| json!([id, position]))
            .collect();

        let added: bool = self
            .send(
                token,
                "playlist.addSongs",
                &json!({ "playlist_id": playlist_id, "songs": songs }),
            )
            .await?;

        if !added {
            return Err(ProviderError::Api("failed to add tracks".to_string()));
        }

        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        token: &str,
        method: &str,
        body: &Value,
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .post(&self.api_url)
            .query(&[
                ("api_token", token),
                ("api_version", "1.0"),
                ("method", method),
            ])
            .header(CACHE_CONTROL, "max-age=0")
            .header(COOKIE, self.cookie_header())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let cookies: Vec<(String, String)> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();
        let raw = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(ProviderError::Status {
                status,
                body: String::from_utf8_lossy(&raw).into_owned(),
            });
        }

        let envelope: DeezerEnvelope = serde_json::from_slice(&raw)?;
        if let Some(err) = envelope_error(&envelope.error) {
            tracing::debug!(method, error = %err, "Gateway reported an error");
            return Err(err);
        }

        self.save_cookies(cookies);

        Ok(serde_json::from_value(envelope.results)?)
    }

    fn cookie_header(&self) -> String {
        let jar = self.jar.lock().unwrap_or_else(|e| e.into_inner());
        jar.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn save_cookies(&self, cookies: Vec<(String, String)>) {
        if cookies.is_empty() {
            return;
        }

        let mut jar = self.jar.lock().unwrap_or_else(|e| e.into_inner());
        jar.extend(cookies);
    }
}

#[async_trait]
impl TrackProvider for DeezerClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn setup(&self) -> Result<(), ProviderError> {
        self.token().await.map(|_| ())
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
        self.add_songs(playlist_id, tracks).await
    }
}

/// Deezer uses `"0"` as a placeholder for missing ids.
fn valid_id(id: &str) -> bool {
    !id.is_empty() && id != "0"
}

/// Extracts `name=value` from a `Set-Cookie` header, ignoring its attributes.
fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
