use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::EngineResult,
    models::{Candidate, CandidateKey, ContentCategory, RatedItem, RecommendationSource},
    services::similarity::{SimilarityIndex, DEFAULT_MIN_SIMILARITY},
    store::ContentStore,
};

/// Keeps collaborative confidence below strong generative confidence
const DAMPING_FACTOR: f32 = 0.8;
/// Neighbors consulted per request
const NEIGHBOR_LIMIT: usize = 5;
/// Top-rated items taken per neighbor
const ITEMS_PER_NEIGHBOR: usize = 3;

/// Suggests items that similar users rated highly
#[derive(Clone)]
pub struct CollaborativeRecommender {
    store: Arc<dyn ContentStore>,
    similarity: SimilarityIndex,
}

impl CollaborativeRecommender {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        let similarity = SimilarityIndex::new(store.clone());
        Self { store, similarity }
    }

    /// Candidates drawn from neighbors' top-rated items in the category
    ///
    /// Each candidate's confidence is the neighbor's similarity damped by a
    /// constant factor; items the requesting user already logged are dropped.
    pub async fn recommend(
        &self,
        user_id: Uuid,
        category: ContentCategory,
        limit: usize,
    ) -> EngineResult<Vec<Candidate>> {
        let neighbors = self
            .similarity
            .find_neighbors(user_id, DEFAULT_MIN_SIMILARITY, NEIGHBOR_LIMIT)
            .await?;

        if neighbors.is_empty() {
            tracing::debug!(user_id = %user_id, category = %category, "No similar users found");
            return Ok(Vec::new());
        }

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut seen: HashSet<CandidateKey> = HashSet::new();

        for neighbor in &neighbors {
            let mut items = self
                .store
                .get_rated_items(neighbor.user_id, category)
                .await?;
            items.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for item in items.into_iter().take(ITEMS_PER_NEIGHBOR) {
                let key = CandidateKey::from(&item);
                if !seen.insert(key.clone()) {
                    continue;
                }
                if self.store.item_exists(user_id, &key).await? {
                    continue;
                }

                let similarity_pct = (neighbor.similarity * 100.0).round() as u32;
                candidates.push(Self::to_candidate(item, neighbor.similarity, similarity_pct));
            }
        }

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);

        tracing::info!(
            user_id = %user_id,
            category = %category,
            neighbors = neighbors.len(),
            candidates = candidates.len(),
            "Collaborative recommendations generated"
        );

        Ok(candidates)
    }

    fn to_candidate(item: RatedItem, similarity: f32, similarity_pct: u32) -> Candidate {
        let mut candidate = Candidate::new(
            item.category,
            item.title,
            (similarity * DAMPING_FACTOR).clamp(0.0, 1.0),
            RecommendationSource::Collaborative,
            format!(
                "Rated {:.1}/5 by a user with {}% similar taste",
                item.rating, similarity_pct
            ),
        );
        candidate.year = item.year;
        candidate.genre = item.genre;
        candidate.artist = item.artist;
        candidate.album = item.album;
        candidate.cuisine = item.cuisine;
        candidate.location = item.location;
        candidate
    }
}
