use serde::Deserialize;

/// Engine configuration loaded from environment variables
///
/// Every provider key is optional: a missing key means the corresponding
/// integration is disabled and the engine routes around it (generation falls
/// back to discovery, discovery falls back to the curated catalog).
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// OpenAI-compatible API key for the generative recommender
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Model name sent with generative requests
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// TMDB API key (movie and TV discovery, poster enrichment)
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Last.fm API key (music discovery)
    #[serde(default)]
    pub lastfm_api_key: Option<String>,

    /// Last.fm API base URL
    #[serde(default = "default_lastfm_api_url")]
    pub lastfm_api_url: String,

    /// Yelp API key (restaurant discovery)
    #[serde(default)]
    pub yelp_api_key: Option<String>,

    /// Yelp API base URL
    #[serde(default = "default_yelp_api_url")]
    pub yelp_api_url: String,

    /// Default city for popular-restaurant lookups
    #[serde(default = "default_yelp_location")]
    pub yelp_default_location: String,

    /// Timeout applied to every outbound provider call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_lastfm_api_url() -> String {
    "https://ws.audioscrobbler.com/2.0".to_string()
}

fn default_yelp_api_url() -> String {
    "https://api.yelp.com/v3".to_string()
}

fn default_yelp_location() -> String {
    "New York, NY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    8
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<EngineConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// True when the generative recommender has credentials
    pub fn is_generative_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_url: default_openai_api_url(),
            openai_model: default_openai_model(),
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            lastfm_api_key: None,
            lastfm_api_url: default_lastfm_api_url(),
            yelp_api_key: None,
            yelp_api_url: default_yelp_api_url(),
            yelp_default_location: default_yelp_location(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_providers_unconfigured() {
        let config = EngineConfig::default();
        assert!(!config.is_generative_configured());
        assert!(config.tmdb_api_key.is_none());
        assert!(config.yelp_api_key.is_none());
        assert_eq!(config.request_timeout_secs, 8);
    }

    #[test]
    fn test_generative_configured_with_key() {
        let config = EngineConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..EngineConfig::default()
        };
        assert!(config.is_generative_configured());
    }
}
