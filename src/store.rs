use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::EngineResult,
    models::{CandidateKey, ContentCategory, RatedItem, TasteProfile},
};

/// Persistence seam for logged content and taste profiles
///
/// The surrounding application owns the real storage; the engine only needs
/// these five operations. Read-only except for taste profile writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// All of a user's logged, rated items in one category
    async fn get_rated_items(
        &self,
        user_id: Uuid,
        category: ContentCategory,
    ) -> EngineResult<Vec<RatedItem>>;

    /// Whether the user already logged an item matching the key
    async fn item_exists(&self, user_id: Uuid, key: &CandidateKey) -> EngineResult<bool>;

    /// Overwrite the user's taste profile
    async fn save_taste_profile(&self, profile: TasteProfile) -> EngineResult<()>;

    async fn load_taste_profile(&self, user_id: Uuid) -> EngineResult<Option<TasteProfile>>;

    /// Every persisted profile except the given user's
    async fn load_all_taste_profiles(&self, excluding: Uuid) -> EngineResult<Vec<TasteProfile>>;
}

/// In-memory content store
///
/// Backs the demo binary and the integration tests. Interior mutability via
/// `tokio::sync::RwLock` so concurrent branches can read while profile
/// refreshes write.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    items: HashMap<Uuid, Vec<RatedItem>>,
    profiles: HashMap<Uuid, TasteProfile>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_item(&self, user_id: Uuid, item: RatedItem) {
        let mut inner = self.inner.write().await;
        inner.items.entry(user_id).or_default().push(item);
    }

    pub async fn add_items(&self, user_id: Uuid, items: Vec<RatedItem>) {
        let mut inner = self.inner.write().await;
        inner.items.entry(user_id).or_default().extend(items);
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryContentStore {
    async fn get_rated_items(
        &self,
        user_id: Uuid,
        category: ContentCategory,
    ) -> EngineResult<Vec<RatedItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .get(&user_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| i.category == category)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn item_exists(&self, user_id: Uuid, key: &CandidateKey) -> EngineResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .get(&user_id)
            .map(|items| items.iter().any(|i| &CandidateKey::from(i) == key))
            .unwrap_or(false))
    }

    async fn save_taste_profile(&self, profile: TasteProfile) -> EngineResult<()> {
        let mut inner = self.inner.write().await;
        inner.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    async fn load_taste_profile(&self, user_id: Uuid) -> EngineResult<Option<TasteProfile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.get(&user_id).cloned())
    }

    async fn load_all_taste_profiles(&self, excluding: Uuid) -> EngineResult<Vec<TasteProfile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .values()
            .filter(|p| p.user_id != excluding)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_rated_items_filters_by_category() {
        let store = MemoryContentStore::new();
        let user = Uuid::new_v4();
        store
            .add_item(user, RatedItem::new(ContentCategory::Movie, "Heat", 4.5))
            .await;
        store
            .add_item(user, RatedItem::new(ContentCategory::Music, "So What", 5.0))
            .await;

        let movies = store
            .get_rated_items(user, ContentCategory::Movie)
            .await
            .unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Heat");
    }

    #[tokio::test]
    async fn test_item_exists_case_insensitive() {
        let store = MemoryContentStore::new();
        let user = Uuid::new_v4();
        store
            .add_item(user, RatedItem::new(ContentCategory::Movie, "Inception", 5.0))
            .await;

        let key = CandidateKey::new(ContentCategory::Movie, "INCEPTION", None);
        assert!(store.item_exists(user, &key).await.unwrap());

        let other = CandidateKey::new(ContentCategory::Movie, "Tenet", None);
        assert!(!store.item_exists(user, &other).await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_roundtrip_and_exclusion() {
        let store = MemoryContentStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.save_taste_profile(TasteProfile::empty(a)).await.unwrap();
        store.save_taste_profile(TasteProfile::empty(b)).await.unwrap();

        assert!(store.load_taste_profile(a).await.unwrap().is_some());

        let others = store.load_all_taste_profiles(a).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].user_id, b);
    }

    #[tokio::test]
    async fn test_save_profile_overwrites() {
        let store = MemoryContentStore::new();
        let user = Uuid::new_v4();
        let mut profile = TasteProfile::empty(user);
        store.save_taste_profile(profile.clone()).await.unwrap();

        profile.personality_tags.push("very-active".to_string());
        store.save_taste_profile(profile).await.unwrap();

        let loaded = store.load_taste_profile(user).await.unwrap().unwrap();
        assert_eq!(loaded.personality_tags, vec!["very-active".to_string()]);
    }
}
