//! External provider abstractions
//!
//! Two seams face the outside world: the generative model (free-text in,
//! hopefully-structured text out) and the per-category discovery APIs
//! (catalog search, popularity charts, image lookup). Both are traits so
//! tests can mock them and so an unconfigured provider is simply absent.

use crate::{error::EngineResult, models::ContentCategory};

pub mod lastfm;
pub mod openai;
pub mod tmdb;
pub mod yelp;

pub use lastfm::LastFmProvider;
pub use openai::OpenAiClient;
pub use tmdb::TmdbProvider;
pub use yelp::YelpProvider;

/// A text-completion model used for personalized suggestion generation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send a prompt, return the raw model output
    ///
    /// Implementations must bound the call with a timeout; the engine treats
    /// any error here as "no candidates", never as a request failure.
    async fn complete(&self, prompt: &str) -> EngineResult<String>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}

/// An item returned by a content-discovery API, before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredItem {
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    /// Provider-native quality score, normalized to [0, 1] where available
    pub external_score: Option<f32>,
}

impl DiscoveredItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            genre: None,
            artist: None,
            cuisine: None,
            location: None,
            image_url: None,
            external_score: None,
        }
    }
}

/// A content-discovery source for one or more categories
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Whether this provider serves the category at all
    fn supports(&self, category: ContentCategory) -> bool;

    /// Items matching a categorical label (genre, cuisine), quality-filtered
    async fn search_by_label(
        &self,
        category: ContentCategory,
        label: &str,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>>;

    /// Generally popular items, unfiltered by personal taste
    async fn list_popular(
        &self,
        category: ContentCategory,
        page: u32,
    ) -> EngineResult<Vec<DiscoveredItem>>;

    /// Best-effort image lookup for an already-chosen title
    async fn find_image(
        &self,
        category: ContentCategory,
        title: &str,
    ) -> EngineResult<Option<String>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
