//! Last.fm discovery provider for music
//!
//! Label search maps to `tag.gettoptracks`, popularity to `chart.gettoptracks`.
//! Last.fm exposes no rating dimension, so discovered tracks carry no external
//! score; tag-ranked position is the only quality signal and is preserved by
//! returning tracks in API order.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{EngineError, EngineResult},
    models::ContentCategory,
    services::providers::{DiscoveredItem, DiscoveryProvider},
};

#[derive(Clone)]
pub struct LastFmProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct TagTracksResponse {
    tracks: TrackList,
}

#[derive(Debug, Deserialize)]
struct TrackList {
    #[serde(default)]
    track: Vec<LastFmTrack>,
}

#[derive(Debug, Deserialize)]
struct LastFmTrack {
    name: String,
    artist: LastFmArtist,
    #[serde(default)]
    image: Vec<LastFmImage>,
}

#[derive(Debug, Deserialize)]
struct LastFmArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LastFmImage {
    #[serde(rename = "#text")]
    url: String,
    size: String,
}

impl LastFmProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> EngineResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(EngineError::HttpClient)?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    async fn fetch_tracks(&self, query: &[(&str, String)]) -> EngineResult<Vec<LastFmTrack>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::ExternalApi(format!(
                "Last.fm API returned status {}: {}",
                status, body
            )));
        }

        let parsed: TagTracksResponse = response.json().await?;
        Ok(parsed.tracks.track)
    }

    fn convert_track(track: LastFmTrack, genre: Option<&str>) -> DiscoveredItem {
        let image_url = track
            .image
            .iter()
            .find(|i| i.size == "large" && !i.url.is_empty())
            .or_else(|| track.image.iter().find(|i| !i.url.is_empty()))
            .map(|i| i.url.clone());

        DiscoveredItem {
            title: track.name,
            year: None,
            genre: genre.map(str::to_string),
            artist: Some(track.artist.name),
            cuisine: None,
            location: None,
            image_url,
            external_score: None,
        }
    }

    fn require_music(category: ContentCategory) -> EngineResult<()> {
        if category != ContentCategory::Music {
            return Err(EngineError::InvalidInput(format!(
                "Last.fm does not serve category {}",
                category
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DiscoveryProvider for LastFmProvider {
    fn supports(&self, category: ContentCategory) -> bool {
        category == ContentCategory::Music
    }

    async fn search_by_label(
        &self,
        category: ContentCategory,
        label: &str,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>> {
        Self::require_music(category)?;

        let tracks = self
            .fetch_tracks(&[
                ("method", "tag.gettoptracks".to_string()),
                ("tag", label.to_string()),
                ("page", page.to_string()),
                ("limit", "20".to_string()),
            ])
            .await?;

        tracing::info!(
            label = %label,
            results = tracks.len(),
            provider = "lastfm",
            "Tag discovery completed"
        );

        Ok(tracks
            .into_iter()
            .map(|t| Self::convert_track(t, Some(label)))
            .collect())
    }

    async fn list_popular(
        &self,
        category: ContentCategory,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>> {
        Self::require_music(category)?;

        let tracks = self
            .fetch_tracks(&[
                ("method", "chart.gettoptracks".to_string()),
                ("page", page.to_string()),
                ("limit", "20".to_string()),
            ])
            .await?;

        Ok(tracks
            .into_iter()
            .map(|t| Self::convert_track(t, None))
            .collect())
    }

    async fn find_image(
        &self,
        _category: ContentCategory,
        _title: &str,
    ) -> EngineResult<Option<String>> {
        // Track images already ride along in search results
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "lastfm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_track_picks_large_image() {
        let track: LastFmTrack = serde_json::from_str(
            r##"{
                "name": "Paranoid Android",
                "artist": { "name": "Radiohead" },
                "image": [
                    { "#text": "http://img/small.png", "size": "small" },
                    { "#text": "http://img/large.png", "size": "large" }
                ]
            }"##,
        )
        .unwrap();

        let item = LastFmProvider::convert_track(track, Some("rock"));
        assert_eq!(item.title, "Paranoid Android");
        assert_eq!(item.artist.as_deref(), Some("Radiohead"));
        assert_eq!(item.genre.as_deref(), Some("rock"));
        assert_eq!(item.image_url.as_deref(), Some("http://img/large.png"));
    }

    #[test]
    fn test_convert_track_without_images() {
        let track: LastFmTrack = serde_json::from_str(
            r#"{ "name": "Ageispolis", "artist": { "name": "Aphex Twin" } }"#,
        )
        .unwrap();

        let item = LastFmProvider::convert_track(track, None);
        assert!(item.image_url.is_none());
        assert!(item.genre.is_none());
    }

    #[test]
    fn test_tag_tracks_deserialization() {
        let json = r#"{
            "tracks": {
                "track": [
                    { "name": "A", "artist": { "name": "X" } },
                    { "name": "B", "artist": { "name": "Y" } }
                ]
            }
        }"#;

        let parsed: TagTracksResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tracks.track.len(), 2);
    }
}
