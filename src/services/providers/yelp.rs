//! Yelp Fusion discovery provider for restaurants
//!
//! Label search hits /businesses/search with a cuisine category alias and a
//! post-filter on rating; "popular" is the same endpoint sorted by review
//! count in the configured default city.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{EngineError, EngineResult},
    models::ContentCategory,
    services::providers::{DiscoveredItem, DiscoveryProvider},
};

const MIN_RATING: f32 = 4.0;
const PAGE_SIZE: u32 = 20;

#[derive(Clone)]
pub struct YelpProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    default_location: String,
}

#[derive(Debug, Deserialize)]
struct BusinessSearchResponse {
    #[serde(default)]
    businesses: Vec<YelpBusiness>,
}

#[derive(Debug, Deserialize)]
struct YelpBusiness {
    name: String,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    categories: Vec<YelpCategory>,
    #[serde(default)]
    location: Option<YelpLocation>,
}

#[derive(Debug, Deserialize)]
struct YelpCategory {
    title: String,
}

#[derive(Debug, Deserialize)]
struct YelpLocation {
    #[serde(default)]
    city: Option<String>,
}

/// Cuisine label -> Yelp category alias
fn category_alias(label: &str) -> Option<&'static str> {
    match label {
        "italian" => Some("italian"),
        "mexican" => Some("mexican"),
        "chinese" => Some("chinese"),
        "japanese" => Some("japanese"),
        "indian" => Some("indpak"),
        "thai" => Some("thai"),
        "american" => Some("newamerican"),
        "french" => Some("french"),
        "mediterranean" => Some("mediterranean"),
        "korean" => Some("korean"),
        _ => None,
    }
}

impl YelpProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        default_location: String,
        timeout: Duration,
    ) -> EngineResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(EngineError::HttpClient)?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
            default_location,
        })
    }

    async fn search_businesses(&self, query: &[(&str, String)]) -> EngineResult<Vec<YelpBusiness>> {
        let url = format!("{}/businesses/search", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::ExternalApi(format!(
                "Yelp API returned status {}: {}",
                status, body
            )));
        }

        let parsed: BusinessSearchResponse = response.json().await?;
        Ok(parsed.businesses)
    }

    fn convert_business(business: YelpBusiness) -> DiscoveredItem {
        let cuisine = business
            .categories
            .iter()
            .map(|c| c.title.clone())
            .collect::<Vec<_>>()
            .join(", ");

        DiscoveredItem {
            title: business.name,
            year: None,
            genre: None,
            artist: None,
            cuisine: (!cuisine.is_empty()).then_some(cuisine),
            location: business.location.and_then(|l| l.city),
            image_url: business.image_url,
            // Yelp ratings run 0-5
            external_score: business.rating.map(|r| (r / 5.0).clamp(0.0, 1.0)),
        }
    }

    fn require_restaurant(category: ContentCategory) -> EngineResult<()> {
        if category != ContentCategory::Restaurant {
            return Err(EngineError::InvalidInput(format!(
                "Yelp does not serve category {}",
                category
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DiscoveryProvider for YelpProvider {
    fn supports(&self, category: ContentCategory) -> bool {
        category == ContentCategory::Restaurant
    }

    async fn search_by_label(
        &self,
        category: ContentCategory,
        label: &str,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>> {
        Self::require_restaurant(category)?;

        let alias = category_alias(label).ok_or_else(|| {
            EngineError::InvalidInput(format!("Unknown Yelp cuisine label: {}", label))
        })?;

        let businesses = self
            .search_businesses(&[
                ("location", self.default_location.clone()),
                ("categories", alias.to_string()),
                ("sort_by", "rating".to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", (page.saturating_sub(1) * PAGE_SIZE).to_string()),
            ])
            .await?;

        let items: Vec<DiscoveredItem> = businesses
            .into_iter()
            .filter(|b| b.rating.unwrap_or(0.0) >= MIN_RATING)
            .map(Self::convert_business)
            .collect();

        tracing::info!(
            label = %label,
            results = items.len(),
            provider = "yelp",
            "Cuisine discovery completed"
        );

        Ok(items)
    }

    async fn list_popular(
        &self,
        category: ContentCategory,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>> {
        Self::require_restaurant(category)?;

        let businesses = self
            .search_businesses(&[
                ("location", self.default_location.clone()),
                ("term", "restaurants".to_string()),
                ("sort_by", "review_count".to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", (page.saturating_sub(1) * PAGE_SIZE).to_string()),
            ])
            .await?;

        Ok(businesses
            .into_iter()
            .map(Self::convert_business)
            .collect())
    }

    async fn find_image(
        &self,
        _category: ContentCategory,
        _title: &str,
    ) -> EngineResult<Option<String>> {
        // Business photos already ride along in search results
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "yelp"
    }
}
