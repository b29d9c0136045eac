mod candidate;
mod content;
mod taste_profile;

pub use candidate::{classify_candidate, Candidate, CandidateKey, RecommendationSource};
pub use content::{split_tags, ContentCategory, RatedItem};
pub use taste_profile::{
    TasteProfile, CUISINE_SLOTS, MOVIE_GENRE_SLOTS, MUSIC_GENRE_SLOTS, TASTE_VECTOR_DIM,
};
