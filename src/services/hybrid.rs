use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::{
    config::EngineConfig,
    error::EngineResult,
    models::{Candidate, CandidateKey, ContentCategory, TasteProfile},
    services::{
        collaborative::CollaborativeRecommender,
        fallback::FallbackChain,
        generative::{GenerativeRecommender, JitterSource, RandomJitter},
        profile::TasteProfileBuilder,
        providers::{
            DiscoveryProvider, GenerativeClient, LastFmProvider, OpenAiClient, TmdbProvider,
            YelpProvider,
        },
    },
    store::ContentStore,
};

/// Share of the final list targeted at the generative branch
const GENERATIVE_SHARE: f32 = 0.7;
pub const DEFAULT_LIMIT: usize = 10;

/// The hybrid recommendation engine
///
/// One request fans out to two concurrent branches: generative (or its
/// fallback chain) and collaborative. Branches never share mutable state;
/// merging happens only after both complete. The worst case under total
/// external failure is an empty list, which callers must treat as "no
/// suggestions right now", not an error.
pub struct RecommendationEngine {
    profile_builder: TasteProfileBuilder,
    collaborative: CollaborativeRecommender,
    generative: Option<GenerativeRecommender>,
    fallbacks: HashMap<ContentCategory, FallbackChain>,
}

impl RecommendationEngine {
    /// Wire the engine from explicit parts
    ///
    /// `discovery` providers are matched to categories by their `supports`
    /// answer; categories nobody serves still get a (curated-only) chain.
    pub fn new(
        store: Arc<dyn ContentStore>,
        generative_client: Option<Arc<dyn GenerativeClient>>,
        discovery: Vec<Arc<dyn DiscoveryProvider>>,
        jitter: Arc<dyn JitterSource>,
    ) -> Self {
        let provider_for = |category: ContentCategory| {
            discovery.iter().find(|p| p.supports(category)).cloned()
        };

        let generative = generative_client.map(|client| {
            GenerativeRecommender::new(store.clone(), client, discovery.clone(), jitter)
        });

        let mut fallbacks = HashMap::new();
        for category in ContentCategory::ALL {
            fallbacks.insert(
                category,
                FallbackChain::new(store.clone(), provider_for(category)),
            );
        }

        Self {
            profile_builder: TasteProfileBuilder::new(store.clone()),
            collaborative: CollaborativeRecommender::new(store),
            generative,
            fallbacks,
        }
    }

    /// Wire the engine from environment configuration
    ///
    /// Providers without credentials simply do not exist; the engine detects
    /// that once, here, instead of attempting doomed calls per request.
    pub fn from_config(store: Arc<dyn ContentStore>, config: &EngineConfig) -> EngineResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let generative_client: Option<Arc<dyn GenerativeClient>> =
            match &config.openai_api_key {
                Some(key) => Some(Arc::new(OpenAiClient::new(
                    key.clone(),
                    config.openai_api_url.clone(),
                    config.openai_model.clone(),
                    timeout,
                )?)),
                None => {
                    tracing::info!("No generative credentials; generation disabled");
                    None
                }
            };

        let mut discovery: Vec<Arc<dyn DiscoveryProvider>> = Vec::new();
        if let Some(key) = &config.tmdb_api_key {
            discovery.push(Arc::new(TmdbProvider::new(
                key.clone(),
                config.tmdb_api_url.clone(),
                timeout,
            )?));
        }
        if let Some(key) = &config.lastfm_api_key {
            discovery.push(Arc::new(LastFmProvider::new(
                key.clone(),
                config.lastfm_api_url.clone(),
                timeout,
            )?));
        }
        if let Some(key) = &config.yelp_api_key {
            discovery.push(Arc::new(YelpProvider::new(
                key.clone(),
                config.yelp_api_url.clone(),
                config.yelp_default_location.clone(),
                timeout,
            )?));
        }

        Ok(Self::new(
            store,
            generative_client,
            discovery,
            Arc::new(RandomJitter),
        ))
    }

    /// Recommendations for one category
    pub async fn recommend(
        &self,
        user_id: Uuid,
        category: ContentCategory,
        limit: usize,
    ) -> EngineResult<Vec<Candidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();

        // Idempotent refresh so similarity always sees current taste
        let profile = self.profile_builder.refresh(user_id).await?;

        let generative_target =
            (((limit as f32) * GENERATIVE_SHARE).ceil() as usize).clamp(1, limit);
        let collaborative_target = limit.saturating_sub(generative_target).max(1);

        let (generative_results, collaborative_results) = tokio::join!(
            self.generative_branch(user_id, category, generative_target, &profile),
            self.collaborative_branch(user_id, category, collaborative_target),
        );

        let merged = merge_candidates(generative_results?, collaborative_results?, limit);

        tracing::info!(
            user_id = %user_id,
            category = %category,
            candidates = merged.len(),
            elapsed = ?start.elapsed(),
            "Recommendation request completed"
        );

        Ok(merged)
    }

    /// Convenience fan-out across all four categories, run concurrently
    pub async fn recommend_all(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> EngineResult<HashMap<ContentCategory, Vec<Candidate>>> {
        let (movies, tv_shows, music, restaurants) = tokio::join!(
            self.recommend(user_id, ContentCategory::Movie, limit),
            self.recommend(user_id, ContentCategory::TvShow, limit),
            self.recommend(user_id, ContentCategory::Music, limit),
            self.recommend(user_id, ContentCategory::Restaurant, limit),
        );

        let mut all = HashMap::new();
        all.insert(ContentCategory::Movie, movies?);
        all.insert(ContentCategory::TvShow, tv_shows?);
        all.insert(ContentCategory::Music, music?);
        all.insert(ContentCategory::Restaurant, restaurants?);
        Ok(all)
    }

    /// Generative output, topped up by the fallback chain when generation is
    /// disabled or comes up short of the branch target
    async fn generative_branch(
        &self,
        user_id: Uuid,
        category: ContentCategory,
        target: usize,
        profile: &TasteProfile,
    ) -> EngineResult<Vec<Candidate>> {
        let mut results = match &self.generative {
            Some(generative) => generative.recommend(user_id, category, target).await?,
            None => Vec::new(),
        };

        if results.len() < target {
            let shortfall = target - results.len();
            tracing::debug!(
                user_id = %user_id,
                category = %category,
                shortfall,
                "Generative branch short, invoking fallback chain"
            );

            let chain = self
                .fallbacks
                .get(&category)
                .expect("every category has a fallback chain");
            let fill = chain
                .recommend(user_id, category, shortfall, Some(profile.clone()))
                .await?;

            let seen: HashSet<CandidateKey> = results.iter().map(Candidate::key).collect();
            results.extend(fill.into_iter().filter(|c| !seen.contains(&c.key())));
        }

        Ok(results)
    }

    async fn collaborative_branch(
        &self,
        user_id: Uuid,
        category: ContentCategory,
        target: usize,
    ) -> EngineResult<Vec<Candidate>> {
        self.collaborative.recommend(user_id, category, target).await
    }
}

/// Concatenate both branches, dedup by normalized key keeping the
/// higher-confidence entry, sort descending, truncate
fn merge_candidates(
    generative: Vec<Candidate>,
    collaborative: Vec<Candidate>,
    limit: usize,
) -> Vec<Candidate> {
    let mut by_key: HashMap<CandidateKey, Candidate> = HashMap::new();

    for candidate in generative.into_iter().chain(collaborative) {
        by_key
            .entry(candidate.key())
            .and_modify(|existing| {
                if candidate.confidence > existing.confidence {
                    *existing = candidate.clone();
                }
            })
            .or_insert(candidate);
    }

    let mut merged: Vec<Candidate> = by_key.into_values().collect();
    merged.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}
