//! TMDB discovery provider for movies and TV shows
//!
//! API flow:
//! 1. Label search: /discover/{movie|tv} with a genre id and a minimum vote
//!    average, so tier-1 fallback results stay above a quality floor.
//! 2. Popular: /{movie|tv}/popular.
//! 3. Image lookup: /search/{movie|tv} and the first result's poster path.
//!
//! TMDB addresses genres by numeric id; the label -> id table is a fixed
//! mapping over the engine's genre vocabulary.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{EngineError, EngineResult},
    models::ContentCategory,
    services::providers::{DiscoveredItem, DiscoveryProvider},
};

const MIN_VOTE_AVERAGE: f32 = 6.5;
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Vec<TmdbEntry>,
}

#[derive(Debug, Deserialize)]
struct TmdbEntry {
    /// Movies use `title`, TV uses `name`
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<i32>,
    #[serde(default)]
    vote_average: Option<f32>,
    #[serde(default)]
    poster_path: Option<String>,
}

/// Genre label -> TMDB genre id, shared by movie and TV discovery
fn genre_id(label: &str) -> Option<i32> {
    match label {
        "action" => Some(28),
        "comedy" => Some(35),
        "drama" => Some(18),
        "horror" => Some(27),
        "sci-fi" => Some(878),
        "romance" => Some(10749),
        "thriller" => Some(53),
        "documentary" => Some(99),
        "animation" => Some(16),
        "fantasy" => Some(14),
        _ => None,
    }
}

/// TMDB genre id -> engine genre label, for tagging discovered items
fn genre_label(id: i32) -> Option<&'static str> {
    match id {
        28 => Some("action"),
        35 => Some("comedy"),
        18 => Some("drama"),
        27 => Some("horror"),
        878 => Some("sci-fi"),
        10749 => Some("romance"),
        53 => Some("thriller"),
        99 => Some("documentary"),
        16 => Some("animation"),
        14 => Some("fantasy"),
        _ => None,
    }
}

impl TmdbProvider {
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

    fn media_path(category: ContentCategory) -> EngineResult<&'static str> {
        match category {
            ContentCategory::Movie => Ok("movie"),
            ContentCategory::TvShow => Ok("tv"),
            other => Err(EngineError::InvalidInput(format!(
                "TMDB does not serve category {}",
                other
            ))),
        }
    }

    async fn fetch_page(&self, url: &str, query: &[(&str, String)]) -> EngineResult<TmdbPage> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    fn convert_entry(entry: TmdbEntry) -> Option<DiscoveredItem> {
        let title = entry.title.or(entry.name)?;
        let year = entry
            .release_date
            .or(entry.first_air_date)
            .and_then(|d| d.get(..4).and_then(|y| y.parse::<i32>().ok()));
        let genre = entry
            .genre_ids
            .iter()
            .filter_map(|id| genre_label(*id))
            .collect::<Vec<_>>()
            .join(", ");

        Some(DiscoveredItem {
            title,
            year,
            genre: (!genre.is_empty()).then_some(genre),
            artist: None,
            cuisine: None,
            location: None,
            image_url: entry
                .poster_path
                .map(|p| format!("{}{}", POSTER_BASE_URL, p)),
            // TMDB vote averages run 0-10
            external_score: entry.vote_average.map(|v| (v / 10.0).clamp(0.0, 1.0)),
        })
    }
}

#[async_trait::async_trait]
impl DiscoveryProvider for TmdbProvider {
    fn supports(&self, category: ContentCategory) -> bool {
        matches!(category, ContentCategory::Movie | ContentCategory::TvShow)
    }

    async fn search_by_label(
        &self,
        category: ContentCategory,
        label: &str,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>> {
        let media = Self::media_path(category)?;
        let genre = genre_id(label).ok_or_else(|| {
            EngineError::InvalidInput(format!("Unknown TMDB genre label: {}", label))
        })?;

        let url = format!("{}/discover/{}", self.api_url, media);
        let tmdb_page = self
            .fetch_page(
                &url,
                &[
                    ("with_genres", genre.to_string()),
                    ("vote_average.gte", MIN_VOTE_AVERAGE.to_string()),
                    ("sort_by", "popularity.desc".to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        let items: Vec<DiscoveredItem> = tmdb_page
            .results
            .into_iter()
            .filter_map(Self::convert_entry)
            .collect();

        tracing::info!(
            category = %category,
            label = %label,
            results = items.len(),
            provider = "tmdb",
            "Label discovery completed"
        );

        Ok(items)
    }

    async fn list_popular(
        &self,
        category: ContentCategory,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>> {
        let media = Self::media_path(category)?;
        let url = format!("{}/{}/popular", self.api_url, media);
        let tmdb_page = self
            .fetch_page(&url, &[("page", page.to_string())])
            .await?;

        Ok(tmdb_page
            .results
            .into_iter()
            .filter_map(Self::convert_entry)
            .collect())
    }

    async fn find_image(
        &self,
        category: ContentCategory,
        title: &str,
    ) -> EngineResult<Option<String>> {
        let media = Self::media_path(category)?;
        let url = format!("{}/search/{}", self.api_url, media);
        let tmdb_page = self
            .fetch_page(&url, &[("query", title.to_string())])
            .await?;

        Ok(tmdb_page
            .results
            .into_iter()
            .filter_map(Self::convert_entry)
            .next()
            .and_then(|item| item.image_url))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
