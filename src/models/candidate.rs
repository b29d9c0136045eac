use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::{ContentCategory, RatedItem};

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecommendationSource {
    #[serde(rename = "generative")]
    Generative,
    #[serde(rename = "collaborative")]
    Collaborative,
    #[serde(rename = "discovery-api")]
    DiscoveryApi,
    #[serde(rename = "curated")]
    Curated,
}

/// An ephemeral recommendation suggestion
///
/// Created fresh per request, filtered against the user's own items, merged,
/// ranked, and returned. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Title for movies/TV/music, business name for restaurants
    pub title: String,
    #[serde(rename = "type")]
    pub category: ContentCategory,
    /// Suggestion strength in [0, 1]
    pub confidence: f32,
    pub source: RecommendationSource,
    /// Short human-readable justification
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Candidate {
    pub fn new(
        category: ContentCategory,
        title: impl Into<String>,
        confidence: f32,
        source: RecommendationSource,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category,
            confidence,
            source,
            reason: reason.into(),
            year: None,
            genre: None,
            artist: None,
            album: None,
            cuisine: None,
            location: None,
            image_url: None,
        }
    }

    /// Normalized identifying key used for deduplication and ownership checks
    pub fn key(&self) -> CandidateKey {
        CandidateKey::new(self.category, &self.title, self.artist.as_deref())
    }
}

/// Normalized identifying key for a piece of content
///
/// Title comparison is case-insensitive; music additionally matches on
/// artist so two different songs sharing a title stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    pub category: ContentCategory,
    pub title: String,
    pub artist: Option<String>,
}

impl CandidateKey {
    pub fn new(category: ContentCategory, title: &str, artist: Option<&str>) -> Self {
        let artist = match category {
            ContentCategory::Music => artist.map(|a| a.trim().to_lowercase()),
            _ => None,
        };
        Self {
            category,
            title: title.trim().to_lowercase(),
            artist,
        }
    }
}

impl From<&RatedItem> for CandidateKey {
    fn from(item: &RatedItem) -> Self {
        CandidateKey::new(item.category, &item.title, item.artist.as_deref())
    }
}

/// Classify a loosely structured candidate object into a content category
///
/// Generative responses sometimes omit the category tag. Rather than guessing,
/// the shape is inspected for category-specific fields and ambiguous objects
/// are reported as `None` so callers can skip them.
pub fn classify_candidate(hint: Option<ContentCategory>, value: &Value) -> Option<ContentCategory> {
    if let Some(tag) = value.get("type").and_then(Value::as_str) {
        match tag.trim().to_lowercase().replace('-', "_").as_str() {
            "movie" | "film" => return Some(ContentCategory::Movie),
            "tv_show" | "tv" | "show" | "series" => return Some(ContentCategory::TvShow),
            "music" | "song" | "track" | "album" => return Some(ContentCategory::Music),
            "restaurant" | "dining" => return Some(ContentCategory::Restaurant),
            _ => {}
        }
    }

    let has = |field: &str| value.get(field).and_then(Value::as_str).is_some();
    if has("artist") || has("album") {
        return Some(ContentCategory::Music);
    }
    if has("cuisine") || (has("name") && has("location")) {
        return Some(ContentCategory::Restaurant);
    }
    // Year + genre alone cannot distinguish movie from TV show; trust the
    // request hint for those, and only for those.
    if has("title") && (value.get("year").is_some() || has("genre")) {
        return match hint {
            Some(h @ (ContentCategory::Movie | ContentCategory::TvShow)) => Some(h),
            _ => None,
        };
    }
    None
}
