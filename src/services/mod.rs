pub mod catalog;
pub mod collaborative;
pub mod fallback;
pub mod generative;
pub mod hybrid;
pub mod profile;
pub mod providers;
pub mod similarity;

pub use collaborative::CollaborativeRecommender;
pub use fallback::{FallbackChain, FallbackTier};
pub use generative::{FixedJitter, GenerativeRecommender, JitterSource, RandomJitter};
pub use hybrid::{RecommendationEngine, DEFAULT_LIMIT};
pub use profile::TasteProfileBuilder;
pub use similarity::{
    cosine_similarity, Neighbor, SimilarityIndex, DEFAULT_MIN_SIMILARITY,
    SELECTIVE_MIN_SIMILARITY,
};
