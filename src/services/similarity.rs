use std::sync::Arc;

use uuid::Uuid;

use crate::{error::EngineResult, services::profile::TasteProfileBuilder, store::ContentStore};

/// Default threshold for exploratory neighbor lookups (activity feeds)
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.5;
/// Stricter threshold for selective surfaces (taste summaries)
///
/// Exported for host applications to pass into `find_neighbors`; the engine
/// itself only uses [`DEFAULT_MIN_SIMILARITY`] internally.
pub const SELECTIVE_MIN_SIMILARITY: f32 = 0.6;

/// A behaviorally similar user
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub user_id: Uuid,
    pub similarity: f32,
}

/// Finds users with similar taste vectors
#[derive(Clone)]
pub struct SimilarityIndex {
    store: Arc<dyn ContentStore>,
    profile_builder: TasteProfileBuilder,
}

impl SimilarityIndex {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        let profile_builder = TasteProfileBuilder::new(store.clone());
        Self {
            store,
            profile_builder,
        }
    }

    /// Ranked, thresholded neighbor list for a user
    ///
    /// Loads the user's profile (computing it on demand when absent), then
    /// scores every other persisted profile. An empty candidate pool yields
    /// an empty list.
    pub async fn find_neighbors(
        &self,
        user_id: Uuid,
        min_similarity: f32,
        limit: usize,
    ) -> EngineResult<Vec<Neighbor>> {
        let profile = match self.store.load_taste_profile(user_id).await? {
            Some(profile) => profile,
            None => self.profile_builder.refresh(user_id).await?,
        };

        let others = self.store.load_all_taste_profiles(user_id).await?;

        let mut neighbors: Vec<Neighbor> = others
            .iter()
            .map(|other| Neighbor {
                user_id: other.user_id,
                similarity: cosine_similarity(&profile.taste_vector, &other.taste_vector),
            })
            .filter(|n| n.similarity > min_similarity)
            .collect();

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(limit);

        tracing::debug!(
            user_id = %user_id,
            pool = others.len(),
            neighbors = neighbors.len(),
            min_similarity,
            "Neighbor search completed"
        );

        Ok(neighbors)
    }
}

/// Cosine similarity with a zero-norm guard
///
/// Either vector having zero norm (a user with no tagged history) yields 0.0
/// rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentCategory, RatedItem, TasteProfile};
    use crate::store::MemoryContentStore;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.5, 0.25, 0.0, 0.25];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = vec![0.3, 0.0, 0.7];
        let b = vec![0.1, 0.9, 0.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        let zero = vec![0.0; 30];
        let v = vec![0.5; 30];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    async fn store_with_profiles(profiles: Vec<TasteProfile>) -> Arc<MemoryContentStore> {
        let store = Arc::new(MemoryContentStore::new());
        for profile in profiles {
            store.save_taste_profile(profile).await.unwrap();
        }
        store
    }

    fn profile_with_vector(slot: usize, value: f32) -> TasteProfile {
        let mut profile = TasteProfile::empty(Uuid::new_v4());
        profile.taste_vector[slot] = value;
        profile
    }

    #[tokio::test]
    async fn test_find_neighbors_filters_and_sorts() {
        let me = profile_with_vector(0, 1.0);
        let my_id = me.user_id;
        let close = profile_with_vector(0, 0.8); // similarity 1.0
        let close_id = close.user_id;
        let mut partial = profile_with_vector(0, 0.5);
        partial.taste_vector[1] = 0.5; // similarity ~0.707
        let partial_id = partial.user_id;
        let far = profile_with_vector(1, 1.0); // similarity 0.0

        let store = store_with_profiles(vec![me, close, partial, far]).await;
        let index = SimilarityIndex::new(store);

        let neighbors = index
            .find_neighbors(my_id, DEFAULT_MIN_SIMILARITY, 10)
            .await
            .unwrap();

        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].user_id, close_id);
        assert_eq!(neighbors[1].user_id, partial_id);
        assert!(neighbors[0].similarity > neighbors[1].similarity);
    }

    #[tokio::test]
    async fn test_find_neighbors_respects_limit() {
        let me = profile_with_vector(2, 1.0);
        let my_id = me.user_id;
        let mut profiles = vec![me];
        for _ in 0..5 {
            profiles.push(profile_with_vector(2, 0.9));
        }
        let store = store_with_profiles(profiles).await;
        let index = SimilarityIndex::new(store);

        let neighbors = index.find_neighbors(my_id, 0.5, 3).await.unwrap();
        assert_eq!(neighbors.len(), 3);
    }

    #[tokio::test]
    async fn test_find_neighbors_empty_pool() {
        let me = profile_with_vector(0, 1.0);
        let my_id = me.user_id;
        let store = store_with_profiles(vec![me]).await;
        let index = SimilarityIndex::new(store);

        let neighbors = index.find_neighbors(my_id, 0.5, 10).await.unwrap();
        assert!(neighbors.is_empty());
    }

    #[tokio::test]
    async fn test_find_neighbors_computes_missing_profile() {
        // The requester has logged items but no persisted profile yet
        let store = Arc::new(MemoryContentStore::new());
        let me = Uuid::new_v4();
        store
            .add_item(
                me,
                RatedItem::new(ContentCategory::Movie, "Alien", 5.0).with_genre("Sci-Fi"),
            )
            .await;

        let mut other = TasteProfile::empty(Uuid::new_v4());
        // sci-fi slot in the movie segment
        other.taste_vector[4] = 1.0;
        store.save_taste_profile(other).await.unwrap();

        let index = SimilarityIndex::new(store.clone());
        let neighbors = index.find_neighbors(me, 0.5, 10).await.unwrap();

        assert_eq!(neighbors.len(), 1);
        assert!((neighbors[0].similarity - 1.0).abs() < 1e-5);
        // Refresh-on-demand persisted the requester's profile
        assert!(store.load_taste_profile(me).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_vector_user_gets_no_neighbors() {
        let me = TasteProfile::empty(Uuid::new_v4());
        let my_id = me.user_id;
        let other = profile_with_vector(0, 1.0);
        let store = store_with_profiles(vec![me, other]).await;
        let index = SimilarityIndex::new(store);

        let neighbors = index.find_neighbors(my_id, 0.5, 10).await.unwrap();
        assert!(neighbors.is_empty());
    }
}
