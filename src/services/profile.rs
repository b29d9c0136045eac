use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::EngineResult,
    models::{split_tags, ContentCategory, RatedItem, TasteProfile},
    store::ContentStore,
};

/// Top-frequency threshold above which a label earns an "-enthusiast" tag
const ENTHUSIAST_THRESHOLD: f32 = 0.3;
/// Total-item thresholds for activity tags
const VERY_ACTIVE_ITEMS: usize = 30;
const ACTIVE_ITEMS: usize = 10;

/// Recomputes and persists a user's taste profile from their rated history
///
/// The whole profile is rebuilt on every call; there is no incremental path.
/// Cheap enough to run synchronously ahead of each recommendation request,
/// and idempotent, so concurrent refreshes just race to the same value.
#[derive(Clone)]
pub struct TasteProfileBuilder {
    store: Arc<dyn ContentStore>,
}

impl TasteProfileBuilder {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Rebuild the profile from scratch and overwrite the stored copy
    ///
    /// A user with zero rated items gets empty frequency maps and an all-zero
    /// vector; that is a valid profile, not an error.
    pub async fn refresh(&self, user_id: Uuid) -> EngineResult<TasteProfile> {
        let mut all_items: Vec<RatedItem> = Vec::new();
        for category in ContentCategory::ALL {
            all_items.extend(self.store.get_rated_items(user_id, category).await?);
        }

        // Movie and TV genres share one domain; music and cuisine get their own
        let screen_items: Vec<&RatedItem> = all_items
            .iter()
            .filter(|i| {
                matches!(i.category, ContentCategory::Movie | ContentCategory::TvShow)
            })
            .collect();
        let music_items: Vec<&RatedItem> = all_items
            .iter()
            .filter(|i| i.category == ContentCategory::Music)
            .collect();
        let restaurant_items: Vec<&RatedItem> = all_items
            .iter()
            .filter(|i| i.category == ContentCategory::Restaurant)
            .collect();

        let movie_genres = Self::label_frequencies(&screen_items);
        let music_genres = Self::label_frequencies(&music_items);
        let cuisines = Self::label_frequencies(&restaurant_items);

        let personality_tags = Self::personality_tags(
            all_items.len(),
            [&movie_genres, &music_genres, &cuisines],
        );

        let taste_vector = TasteProfile::build_vector(&movie_genres, &music_genres, &cuisines);

        let profile = TasteProfile {
            user_id,
            movie_genres,
            music_genres,
            cuisines,
            personality_tags,
            taste_vector,
            last_analyzed: Utc::now(),
        };

        self.store.save_taste_profile(profile.clone()).await?;

        tracing::debug!(
            user_id = %user_id,
            items = all_items.len(),
            tags = profile.personality_tags.len(),
            "Taste profile refreshed"
        );

        Ok(profile)
    }

    /// Label -> fraction of tagged items carrying that label
    ///
    /// Items without a tag field are excluded from the denominator, so the
    /// per-label fractions of a domain sum to at most 1 (an item with N labels
    /// contributes 1/N weight to each).
    fn label_frequencies(items: &[&RatedItem]) -> HashMap<String, f32> {
        let mut weights: HashMap<String, f32> = HashMap::new();
        let mut tagged_count = 0usize;

        for item in items {
            let labels = match item.tag_field() {
                Some(raw) => split_tags(raw),
                None => continue,
            };
            if labels.is_empty() {
                continue;
            }
            tagged_count += 1;
            let share = 1.0 / labels.len() as f32;
            for label in labels {
                *weights.entry(label).or_insert(0.0) += share;
            }
        }

        if tagged_count == 0 {
            return HashMap::new();
        }

        weights
            .into_iter()
            .map(|(label, weight)| (label, weight / tagged_count as f32))
            .collect()
    }

    fn personality_tags(
        total_items: usize,
        domains: [&HashMap<String, f32>; 3],
    ) -> Vec<String> {
        let mut tags = Vec::new();

        for frequencies in domains {
            let top = frequencies
                .iter()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
            if let Some((label, frequency)) = top {
                if *frequency >= ENTHUSIAST_THRESHOLD {
                    tags.push(format!("{}-enthusiast", label));
                }
            }
        }

        if total_items >= VERY_ACTIVE_ITEMS {
            tags.push("very-active".to_string());
        } else if total_items >= ACTIVE_ITEMS {
            tags.push("active".to_string());
        } else if total_items > 0 {
            tags.push("casual-logger".to_string());
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryContentStore;

    fn movie(title: &str, genre: &str, rating: f32) -> RatedItem {
        RatedItem::new(ContentCategory::Movie, title, rating).with_genre(genre)
    }

    async fn seeded_store(items: Vec<RatedItem>) -> (Arc<MemoryContentStore>, Uuid) {
        let store = Arc::new(MemoryContentStore::new());
        let user = Uuid::new_v4();
        store.add_items(user, items).await;
        (store, user)
    }

    #[tokio::test]
    async fn test_refresh_empty_user_is_valid() {
        let (store, user) = seeded_store(vec![]).await;
        let builder = TasteProfileBuilder::new(store.clone());

        let profile = builder.refresh(user).await.unwrap();

        assert!(profile.movie_genres.is_empty());
        assert!(profile.taste_vector.iter().all(|v| *v == 0.0));
        assert_eq!(profile.taste_vector.len(), 30);
        assert!(profile.personality_tags.is_empty());
        // Still persisted
        assert!(store.load_taste_profile(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_frequencies_sum_to_at_most_one() {
        let (store, user) = seeded_store(vec![
            movie("A", "Action, Sci-Fi", 4.0),
            movie("B", "Drama", 5.0),
            movie("C", "Drama, Thriller", 3.5),
        ])
        .await;
        let builder = TasteProfileBuilder::new(store);

        let profile = builder.refresh(user).await.unwrap();
        let sum: f32 = profile.movie_genres.values().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {}", sum);
        assert!(profile.movie_genres["drama"] > profile.movie_genres["thriller"]);
    }

    #[tokio::test]
    async fn test_untagged_items_excluded_from_denominator() {
        let (store, user) = seeded_store(vec![
            movie("A", "Comedy", 4.0),
            RatedItem::new(ContentCategory::Movie, "B", 3.0),
        ])
        .await;
        let builder = TasteProfileBuilder::new(store);

        let profile = builder.refresh(user).await.unwrap();
        assert_eq!(profile.movie_genres["comedy"], 1.0);
    }

    #[tokio::test]
    async fn test_tv_genres_fold_into_movie_domain() {
        let (store, user) = seeded_store(vec![
            movie("Heat", "Thriller", 4.5),
            RatedItem::new(ContentCategory::TvShow, "Fargo", 5.0).with_genre("Thriller"),
        ])
        .await;
        let builder = TasteProfileBuilder::new(store);

        let profile = builder.refresh(user).await.unwrap();
        assert_eq!(profile.movie_genres["thriller"], 1.0);
    }

    #[tokio::test]
    async fn test_personality_tags() {
        let items: Vec<RatedItem> = (0..12).map(|i| movie(&format!("M{}", i), "Drama", 4.0)).collect();
        let (store, user) = seeded_store(items).await;
        let builder = TasteProfileBuilder::new(store);

        let profile = builder.refresh(user).await.unwrap();
        assert!(profile.personality_tags.contains(&"drama-enthusiast".to_string()));
        assert!(profile.personality_tags.contains(&"active".to_string()));
        assert!(!profile.personality_tags.contains(&"very-active".to_string()));
    }

    #[tokio::test]
    async fn test_identical_histories_produce_identical_vectors() {
        let store = Arc::new(MemoryContentStore::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        for user in [a, b] {
            store
                .add_items(
                    user,
                    vec![movie("Alien", "Sci-Fi, Horror", 5.0), movie("Up", "Animation", 4.0)],
                )
                .await;
        }
        let builder = TasteProfileBuilder::new(store);

        let pa = builder.refresh(a).await.unwrap();
        let pb = builder.refresh(b).await.unwrap();
        assert_eq!(pa.taste_vector, pb.taste_vector);
    }
}
