use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Content category a user can log and get recommendations for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Movie,
    TvShow,
    Music,
    Restaurant,
}

impl ContentCategory {
    /// All categories, in fan-out order
    pub const ALL: [ContentCategory; 4] = [
        ContentCategory::Movie,
        ContentCategory::TvShow,
        ContentCategory::Music,
        ContentCategory::Restaurant,
    ];

    /// Human-readable plural used in prompts and log lines
    pub fn plural(&self) -> &'static str {
        match self {
            ContentCategory::Movie => "movies",
            ContentCategory::TvShow => "TV shows",
            ContentCategory::Music => "songs",
            ContentCategory::Restaurant => "restaurants",
        }
    }
}

impl Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentCategory::Movie => write!(f, "movie"),
            ContentCategory::TvShow => write!(f, "tv_show"),
            ContentCategory::Music => write!(f, "music"),
            ContentCategory::Restaurant => write!(f, "restaurant"),
        }
    }
}

/// One logged, rated item as returned by the content store
///
/// Tag fields (`genre`, `cuisine`) may hold comma-joined multi-values
/// ("Action, Sci-Fi"); consumers split them into individual labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedItem {
    pub id: Uuid,
    pub category: ContentCategory,
    /// Title for movies/TV/music, business name for restaurants
    pub title: String,
    /// 0.0 to 5.0 stars
    pub rating: f32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl RatedItem {
    /// Minimal constructor; category-specific fields start empty
    pub fn new(category: ContentCategory, title: impl Into<String>, rating: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            title: title.into(),
            rating,
            created_at: Utc::now(),
            year: None,
            genre: None,
            artist: None,
            album: None,
            cuisine: None,
            location: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    /// The raw tag field feeding taste-profile frequency counting
    pub fn tag_field(&self) -> Option<&str> {
        match self.category {
            ContentCategory::Movie | ContentCategory::TvShow | ContentCategory::Music => {
                self.genre.as_deref()
            }
            ContentCategory::Restaurant => self.cuisine.as_deref(),
        }
    }
}

/// Split a possibly comma-joined tag field into normalized labels
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags_multi_value() {
        assert_eq!(
            split_tags("Action, Sci-Fi,  Thriller"),
            vec!["action", "sci-fi", "thriller"]
        );
    }

    #[test]
    fn test_split_tags_ignores_empty_segments() {
        assert_eq!(split_tags("Jazz,,  "), vec!["jazz"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_tag_field_per_category() {
        let movie = RatedItem::new(ContentCategory::Movie, "Dune", 4.5).with_genre("Sci-Fi");
        assert_eq!(movie.tag_field(), Some("Sci-Fi"));

        let restaurant = RatedItem::new(ContentCategory::Restaurant, "Nobu", 5.0)
            .with_cuisine("Japanese");
        assert_eq!(restaurant.tag_field(), Some("Japanese"));

        let untagged = RatedItem::new(ContentCategory::Music, "Untitled", 3.0);
        assert_eq!(untagged.tag_field(), None);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&ContentCategory::TvShow).unwrap(),
            "\"tv_show\""
        );
        assert_eq!(
            serde_json::to_string(&ContentCategory::Restaurant).unwrap(),
            "\"restaurant\""
        );
    }
}
