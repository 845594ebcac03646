use reqwest::StatusCode;

use super::{SpotifyClient, read_json};
use crate::{error::ProviderError, types::SpotifySearchResponse, types::Track, utils};

impl SpotifyClient {
    /// Searches the catalog for tracks matching `query`.
    ///
    /// Returns up to the configured search limit of candidates in relevance
    /// order. A query without results yields an empty vector.
    ///
    /// # Example
    ///
    /// ```
    /// let matches = client.search("Porno For Pyros Tahitian Moon").await?;
    /// if let Some(best) = matches.first() {
    ///     println!("{} -> {}", best.name, best.id); // spotify:track:...
    /// }
    /// ```
    pub async fn search(&self, query: &str) -> Result<Vec<Track>, ProviderError> {
        let limit = self.search_limit.to_string();
        let response = self
            .get("/search")
            .query(&[("type", "track"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        let res: SpotifySearchResponse = read_json(response, StatusCode::OK).await?;

        let tracks = res
            .tracks
            .items
            .into_iter()
            .flatten()
            .filter(|item| !item.uri.is_empty())
            .map(|item| {
                let artists: Vec<&str> = item.artists.iter().map(|a| a.name.as_str()).collect();
                let album = item.album.as_ref().map(|a| a.name.as_str()).unwrap_or("");
                let name = utils::display_name(&artists, &item.name, album);
                Track::new(item.uri, name)
            })
            .collect();

        Ok(tracks)
    }
}
