//! Demo binary: seeds an in-memory store with a sample user and prints the
//! engine's recommendations. With no API keys in the environment, everything
//! comes from the curated fallback; export OPENAI_API_KEY / TMDB_API_KEY /
//! LASTFM_API_KEY / YELP_API_KEY to exercise the live providers.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use palate_engine::services::DEFAULT_LIMIT;
use palate_engine::{
    ContentCategory, EngineConfig, MemoryContentStore, RatedItem, RecommendationEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = EngineConfig::from_env()?;

    let store = Arc::new(MemoryContentStore::new());
    let user = Uuid::new_v4();
    store
        .add_items(
            user,
            vec![
                RatedItem::new(ContentCategory::Movie, "Arrival", 5.0)
                    .with_genre("Sci-Fi, Drama")
                    .with_year(2016),
                RatedItem::new(ContentCategory::Movie, "Whiplash", 4.5)
                    .with_genre("Drama")
                    .with_year(2014),
                RatedItem::new(ContentCategory::Music, "So What", 5.0)
                    .with_artist("Miles Davis")
                    .with_genre("Jazz"),
                RatedItem::new(ContentCategory::Restaurant, "Uncle Boons", 4.0)
                    .with_cuisine("Thai"),
            ],
        )
        .await;

    let engine = RecommendationEngine::from_config(store, &config)?;
    let recommendations = engine.recommend_all(user, DEFAULT_LIMIT).await?;

    for category in ContentCategory::ALL {
        if let Some(candidates) = recommendations.get(&category) {
            println!(
                "== {} ==\n{}",
                category.plural(),
                serde_json::to_string_pretty(candidates)?
            );
        }
    }

    Ok(())
}
