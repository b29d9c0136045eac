//! Hybrid recommendation and taste-similarity engine.
//!
//! Converts a user's rated movies, TV shows, music, and restaurants into a
//! fixed-shape taste profile, finds behaviorally similar users by cosine
//! similarity, and blends generative-model suggestions with collaborative
//! filtering. When the generative path is unavailable the engine degrades
//! through external discovery APIs down to an embedded curated catalog, so a
//! request never fails outright; the floor is an empty list.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use models::{Candidate, CandidateKey, ContentCategory, RatedItem, RecommendationSource, TasteProfile};
pub use services::RecommendationEngine;
pub use store::{ContentStore, MemoryContentStore};
