use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// A candidate match returned by a streaming backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Provider-stable identity, used for deduplication.
    pub id: String,
    /// Human readable label.
    pub name: String,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Tabled)]
pub struct MatchTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub query: String,
    pub track: String,
    pub status: String,
}

// Spotify Web API

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyUserResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySearchResponse {
    pub tracks: SpotifyTrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrackPage {
    /// Unavailable items come back as `null`.
    #[serde(default)]
    pub items: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyErrorResponse {
    pub error: SpotifyErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyErrorBody {
    pub message: String,
}

// Deezer gateway

/// Every gateway response. `results` is only meaningful when `error` is empty.
#[derive(Debug, Clone, Deserialize)]
pub struct DeezerEnvelope {
    #[serde(default)]
    pub error: serde_json::Value,
    #[serde(default)]
    pub results: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerUserData {
    #[serde(rename = "USER", default)]
    pub user: DeezerUser,
    #[serde(rename = "checkForm")]
    pub check_form: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeezerUser {
    #[serde(rename = "USER_ID", default, deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerSearchResults {
    #[serde(rename = "TRACK", default)]
    pub track: DeezerTrackPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeezerTrackPage {
    #[serde(default)]
    pub data: Vec<DeezerSong>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerSong {
    #[serde(rename = "SNG_ID", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "SNG_TITLE", default)]
    pub title: String,
    #[serde(rename = "ART_NAME", default)]
    pub artist: String,
    #[serde(rename = "ALB_TITLE", default)]
    pub album: String,
}

/// Deezer returns identifiers as strings in some payloads and as numbers in others.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
