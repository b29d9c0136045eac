use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::EngineResult,
    models::{
        Candidate, CandidateKey, ContentCategory, RecommendationSource, TasteProfile,
    },
    services::{
        catalog::curated_entries,
        providers::{DiscoveredItem, DiscoveryProvider},
    },
    store::ContentStore,
};

/// Confidence band starts per tier; each decays by position
const PREFERENCE_BASE: f32 = 0.75;
const POPULAR_BASE: f32 = 0.60;
const CURATED_BASE: f32 = 0.45;
const POSITION_DECAY: f32 = 0.02;
const CONFIDENCE_FLOOR: f32 = 0.20;

/// Top frequency labels used to seed preference-aware discovery
const PREFERRED_LABELS: usize = 2;
/// Minimum provider-native quality score for tier-1 results
const MIN_EXTERNAL_SCORE: f32 = 0.6;

/// What a fallback tier needs to know about the request
pub struct FallbackRequest {
    pub user_id: Uuid,
    pub category: ContentCategory,
    pub limit: usize,
    /// Taste context when the caller already refreshed the profile
    pub profile: Option<TasteProfile>,
}

/// One strategy in the fallback chain
///
/// `attempt` must swallow its own transport and parsing errors and come back
/// empty instead, so the chain always completes.
#[async_trait::async_trait]
pub trait FallbackTier: Send + Sync {
    async fn attempt(&self, request: &FallbackRequest) -> Vec<Candidate>;
    fn name(&self) -> &'static str;
}

/// Tier 1: discovery filtered by the user's top categorical labels
pub struct PreferenceDiscoveryTier {
    provider: Arc<dyn DiscoveryProvider>,
}

/// Tier 2: generally popular items, no personalization
pub struct PopularDiscoveryTier {
    provider: Arc<dyn DiscoveryProvider>,
}

/// Tier 3: the embedded curated catalog
pub struct CuratedCatalogTier;

impl PreferenceDiscoveryTier {
    pub fn new(provider: Arc<dyn DiscoveryProvider>) -> Self {
        Self { provider }
    }

    /// The user's strongest labels in the requested category's domain
    fn top_labels(profile: &TasteProfile, category: ContentCategory) -> Vec<String> {
        let frequencies = match category {
            ContentCategory::Movie | ContentCategory::TvShow => &profile.movie_genres,
            ContentCategory::Music => &profile.music_genres,
            ContentCategory::Restaurant => &profile.cuisines,
        };
        let mut labels: Vec<(&String, &f32)> = frequencies.iter().collect();
        labels.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        labels
            .into_iter()
            .take(PREFERRED_LABELS)
            .map(|(label, _)| label.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl FallbackTier for PreferenceDiscoveryTier {
    async fn attempt(&self, request: &FallbackRequest) -> Vec<Candidate> {
        let Some(profile) = &request.profile else {
            return Vec::new();
        };
        let labels = Self::top_labels(profile, request.category);
        if labels.is_empty() {
            return Vec::new();
        }

        let mut items: Vec<DiscoveredItem> = Vec::new();
        for label in &labels {
            match self
                .provider
                .search_by_label(request.category, label, 1)
                .await
            {
                Ok(found) => items.extend(
                    found
                        .into_iter()
                        .filter(|i| i.external_score.unwrap_or(1.0) >= MIN_EXTERNAL_SCORE),
                ),
                Err(e) => {
                    tracing::warn!(
                        user_id = %request.user_id,
                        category = %request.category,
                        label = %label,
                        tier = self.name(),
                        error = %e,
                        "Preference discovery failed for label"
                    );
                }
            }
        }

        to_candidates(
            items,
            request,
            PREFERENCE_BASE,
            RecommendationSource::DiscoveryApi,
            |label| format!("Highly rated and matches your taste for {}", label),
        )
    }

    fn name(&self) -> &'static str {
        "preference-discovery"
    }
}

impl PopularDiscoveryTier {
    pub fn new(provider: Arc<dyn DiscoveryProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl FallbackTier for PopularDiscoveryTier {
    async fn attempt(&self, request: &FallbackRequest) -> Vec<Candidate> {
        let items = match self.provider.list_popular(request.category, 1).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    user_id = %request.user_id,
                    category = %request.category,
                    tier = self.name(),
                    error = %e,
                    "Popular discovery failed"
                );
                return Vec::new();
            }
        };

        to_candidates(
            items,
            request,
            POPULAR_BASE,
            RecommendationSource::DiscoveryApi,
            |_| "Popular with a wide audience right now".to_string(),
        )
    }

    fn name(&self) -> &'static str {
        "popular-discovery"
    }
}

#[async_trait::async_trait]
impl FallbackTier for CuratedCatalogTier {
    async fn attempt(&self, request: &FallbackRequest) -> Vec<Candidate> {
        let items: Vec<DiscoveredItem> = curated_entries(request.category)
            .iter()
            .map(|entry| {
                let mut item = DiscoveredItem::new(entry.title);
                item.year = entry.year;
                item.artist = entry.artist.map(str::to_string);
                item.location = entry.location.map(str::to_string);
                match request.category {
                    ContentCategory::Restaurant => item.cuisine = Some(entry.tag.to_string()),
                    _ => item.genre = Some(entry.tag.to_string()),
                }
                item
            })
            .collect();

        to_candidates(
            items,
            request,
            CURATED_BASE,
            RecommendationSource::Curated,
            |_| "A widely loved classic".to_string(),
        )
    }

    fn name(&self) -> &'static str {
        "curated-catalog"
    }
}

fn to_candidates(
    items: Vec<DiscoveredItem>,
    request: &FallbackRequest,
    base: f32,
    source: RecommendationSource,
    reason: impl Fn(&str) -> String,
) -> Vec<Candidate> {
    items
        .into_iter()
        .take(request.limit)
        .enumerate()
        .map(|(position, item)| {
            let label = item
                .genre
                .as_deref()
                .or(item.cuisine.as_deref())
                .unwrap_or(request.category.plural());
            let confidence =
                (base - POSITION_DECAY * position as f32).max(CONFIDENCE_FLOOR);
            let mut candidate = Candidate::new(
                request.category,
                item.title,
                confidence,
                source,
                reason(label),
            );
            candidate.year = item.year;
            candidate.genre = item.genre;
            candidate.artist = item.artist;
            candidate.cuisine = item.cuisine;
            candidate.location = item.location;
            candidate.image_url = item.image_url;
            candidate
        })
        .collect()
}

/// Ordered chain of discovery strategies
///
/// Invoked when generation is disabled or comes up short. Tiers run in order
/// until the accumulated result reaches the requested limit; results are
/// deduplicated across tiers and filtered against the user's own items.
pub struct FallbackChain {
    store: Arc<dyn ContentStore>,
    tiers: Vec<Box<dyn FallbackTier>>,
}

impl FallbackChain {
    /// Standard three-tier chain; network tiers only exist when a provider
    /// serves the category, so unconfigured setups skip straight to curated.
    pub fn new(
        store: Arc<dyn ContentStore>,
        provider: Option<Arc<dyn DiscoveryProvider>>,
    ) -> Self {
        let mut tiers: Vec<Box<dyn FallbackTier>> = Vec::new();
        if let Some(provider) = provider {
            tiers.push(Box::new(PreferenceDiscoveryTier::new(provider.clone())));
            tiers.push(Box::new(PopularDiscoveryTier::new(provider)));
        }
        tiers.push(Box::new(CuratedCatalogTier));
        Self { store, tiers }
    }

    pub async fn recommend(
        &self,
        user_id: Uuid,
        category: ContentCategory,
        limit: usize,
        profile: Option<TasteProfile>,
    ) -> EngineResult<Vec<Candidate>> {
        let request = FallbackRequest {
            user_id,
            category,
            limit,
            profile,
        };

        let mut results: Vec<Candidate> = Vec::new();
        let mut seen: HashSet<CandidateKey> = HashSet::new();

        for tier in &self.tiers {
            if results.len() >= limit {
                break;
            }
            let attempt = tier.attempt(&request).await;
            tracing::debug!(
                user_id = %user_id,
                category = %category,
                tier = tier.name(),
                found = attempt.len(),
                "Fallback tier attempted"
            );

            for candidate in attempt {
                if results.len() >= limit {
                    break;
                }
                let key = candidate.key();
                if !seen.insert(key.clone()) {
                    continue;
                }
                if self.store.item_exists(user_id, &key).await? {
                    continue;
                }
                results.push(candidate);
            }
        }

        tracing::info!(
            user_id = %user_id,
            category = %category,
            candidates = results.len(),
            "Fallback chain completed"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatedItem;
    use crate::services::providers::MockDiscoveryProvider;
    use crate::store::MemoryContentStore;

    fn request_profile(genre: &str, frequency: f32) -> TasteProfile {
        let mut profile = TasteProfile::empty(Uuid::new_v4());
        profile.movie_genres.insert(genre.to_string(), frequency);
        profile
    }

    #[tokio::test]
    async fn test_curated_only_chain_returns_catalog_items() {
        let store = Arc::new(MemoryContentStore::new());
        let chain = FallbackChain::new(store, None);

        let results = chain
            .recommend(Uuid::new_v4(), ContentCategory::Movie, 5, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        for candidate in &results {
            assert_eq!(candidate.source, RecommendationSource::Curated);
            assert!(candidate.confidence <= CURATED_BASE);
            assert!(candidate.confidence >= CONFIDENCE_FLOOR);
        }
    }

    #[tokio::test]
    async fn test_curated_tier_filters_owned() {
        let store = Arc::new(MemoryContentStore::new());
        let user = Uuid::new_v4();
        store
            .add_item(
                user,
                RatedItem::new(ContentCategory::Movie, "the shawshank redemption", 5.0),
            )
            .await;
        let chain = FallbackChain::new(store, None);

        let results = chain
            .recommend(user, ContentCategory::Movie, 20, None)
            .await
            .unwrap();

        assert!(results
            .iter()
            .all(|c| !c.title.eq_ignore_ascii_case("the shawshank redemption")));
    }

    #[tokio::test]
    async fn test_preference_tier_uses_top_label_and_quality_floor() {
        let mut provider = MockDiscoveryProvider::new();
        provider
            .expect_search_by_label()
            .withf(|_, label, _| label == "sci-fi")
            .returning(|_, _, _| {
                let mut good = DiscoveredItem::new("Arrival");
                good.external_score = Some(0.8);
                good.genre = Some("sci-fi".to_string());
                let mut bad = DiscoveredItem::new("Bad Sequel");
                bad.external_score = Some(0.3);
                Ok(vec![good, bad])
            });

        let request = FallbackRequest {
            user_id: Uuid::new_v4(),
            category: ContentCategory::Movie,
            limit: 10,
            profile: Some(request_profile("sci-fi", 0.9)),
        };

        let tier = PreferenceDiscoveryTier::new(Arc::new(provider));
        let results = tier.attempt(&request).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Arrival");
        assert_eq!(results[0].source, RecommendationSource::DiscoveryApi);
        assert!((results[0].confidence - PREFERENCE_BASE).abs() < 1e-5);
        assert!(results[0].reason.contains("sci-fi"));
    }

    #[tokio::test]
    async fn test_preference_tier_without_profile_is_empty() {
        let provider = MockDiscoveryProvider::new();
        let tier = PreferenceDiscoveryTier::new(Arc::new(provider));
        let request = FallbackRequest {
            user_id: Uuid::new_v4(),
            category: ContentCategory::Movie,
            limit: 10,
            profile: None,
        };
        assert!(tier.attempt(&request).await.is_empty());
    }

    #[tokio::test]
    async fn test_tier_errors_are_swallowed_and_chain_falls_through() {
        let mut provider = MockDiscoveryProvider::new();
        provider.expect_search_by_label().returning(|_, _, _| {
            Err(crate::error::EngineError::ExternalApi("down".to_string()))
        });
        provider.expect_list_popular().returning(|_, _| {
            Err(crate::error::EngineError::ExternalApi("down".to_string()))
        });

        let store = Arc::new(MemoryContentStore::new());
        let chain = FallbackChain::new(store, Some(Arc::new(provider)));

        let results = chain
            .recommend(
                Uuid::new_v4(),
                ContentCategory::Movie,
                4,
                Some(request_profile("drama", 0.8)),
            )
            .await
            .unwrap();

        // Both network tiers failed; curated still delivers
        assert_eq!(results.len(), 4);
        assert!(results
            .iter()
            .all(|c| c.source == RecommendationSource::Curated));
    }

    #[tokio::test]
    async fn test_tiers_combine_and_dedup_up_to_limit() {
        let mut provider = MockDiscoveryProvider::new();
        provider.expect_search_by_label().returning(|_, _, _| {
            let mut item = DiscoveredItem::new("Parasite");
            item.external_score = Some(0.9);
            Ok(vec![item])
        });
        provider.expect_list_popular().returning(|_, _| {
            // Duplicate of the tier-1 result plus one new item
            Ok(vec![
                DiscoveredItem::new("parasite"),
                DiscoveredItem::new("Oldboy"),
            ])
        });

        let store = Arc::new(MemoryContentStore::new());
        let chain = FallbackChain::new(store, Some(Arc::new(provider)));

        let results = chain
            .recommend(
                Uuid::new_v4(),
                ContentCategory::Movie,
                3,
                Some(request_profile("thriller", 0.7)),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let titles: Vec<String> = results.iter().map(|c| c.title.to_lowercase()).collect();
        assert_eq!(
            titles.iter().filter(|t| t.as_str() == "parasite").count(),
            1
        );
        assert!(titles.contains(&"oldboy".to_string()));
    }

    #[tokio::test]
    async fn test_popular_tier_confidence_below_preference_tier() {
        let mut provider = MockDiscoveryProvider::new();
        provider
            .expect_list_popular()
            .returning(|_, _| Ok(vec![DiscoveredItem::new("Dune")]));

        let tier = PopularDiscoveryTier::new(Arc::new(provider));
        let request = FallbackRequest {
            user_id: Uuid::new_v4(),
            category: ContentCategory::Movie,
            limit: 5,
            profile: None,
        };

        let results = tier.attempt(&request).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].confidence < PREFERENCE_BASE);
        assert!((results[0].confidence - POPULAR_BASE).abs() < 1e-5);
    }
}
