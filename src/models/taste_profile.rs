use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Fixed slot ordering for the movie-genre segment of the taste vector
pub const MOVIE_GENRE_SLOTS: [&str; 10] = [
    "action",
    "comedy",
    "drama",
    "horror",
    "sci-fi",
    "romance",
    "thriller",
    "documentary",
    "animation",
    "fantasy",
];

/// Fixed slot ordering for the music-genre segment of the taste vector
pub const MUSIC_GENRE_SLOTS: [&str; 10] = [
    "pop",
    "rock",
    "hip-hop",
    "jazz",
    "classical",
    "electronic",
    "country",
    "r&b",
    "metal",
    "indie",
];

/// Fixed slot ordering for the cuisine segment of the taste vector
pub const CUISINE_SLOTS: [&str; 10] = [
    "italian",
    "mexican",
    "chinese",
    "japanese",
    "indian",
    "thai",
    "american",
    "french",
    "mediterranean",
    "korean",
];

/// Total taste vector dimensionality
///
/// The vector is the concatenation of the three slot lists above, in that
/// order. Any two profiles are comparable because the ordering is a crate-wide
/// constant.
pub const TASTE_VECTOR_DIM: usize =
    MOVIE_GENRE_SLOTS.len() + MUSIC_GENRE_SLOTS.len() + CUISINE_SLOTS.len();

/// A user's aggregated taste signature
///
/// Rebuilt in full on every refresh; never patched incrementally. Frequency
/// values are fractions of the user's tagged items per domain and sum to at
/// most 1 per map. Missing data is 0.0, never null, so cosine similarity is
/// always well-defined wherever norms are nonzero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasteProfile {
    pub user_id: Uuid,
    /// Movie and TV genre label -> fraction of tagged screen items
    pub movie_genres: HashMap<String, f32>,
    /// Music genre label -> fraction of tagged music items
    pub music_genres: HashMap<String, f32>,
    /// Cuisine label -> fraction of tagged restaurant items
    pub cuisines: HashMap<String, f32>,
    /// Derived labels like "drama-enthusiast"; informational only
    pub personality_tags: Vec<String>,
    /// Fixed 30-dimensional preference embedding
    pub taste_vector: Vec<f32>,
    pub last_analyzed: DateTime<Utc>,
}

impl TasteProfile {
    /// An all-zero profile for a user with no rated items
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            movie_genres: HashMap::new(),
            music_genres: HashMap::new(),
            cuisines: HashMap::new(),
            personality_tags: Vec::new(),
            taste_vector: vec![0.0; TASTE_VECTOR_DIM],
            last_analyzed: Utc::now(),
        }
    }

    /// Build the fixed-order vector from the three frequency maps
    pub fn build_vector(
        movie_genres: &HashMap<String, f32>,
        music_genres: &HashMap<String, f32>,
        cuisines: &HashMap<String, f32>,
    ) -> Vec<f32> {
        let mut vector = Vec::with_capacity(TASTE_VECTOR_DIM);
        for slot in MOVIE_GENRE_SLOTS {
            vector.push(movie_genres.get(slot).copied().unwrap_or(0.0));
        }
        for slot in MUSIC_GENRE_SLOTS {
            vector.push(music_genres.get(slot).copied().unwrap_or(0.0));
        }
        for slot in CUISINE_SLOTS {
            vector.push(cuisines.get(slot).copied().unwrap_or(0.0));
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_dim_is_thirty() {
        assert_eq!(TASTE_VECTOR_DIM, 30);
        assert_eq!(TasteProfile::empty(Uuid::new_v4()).taste_vector.len(), 30);
    }

    #[test]
    fn test_build_vector_slot_positions() {
        let mut movie_genres = HashMap::new();
        movie_genres.insert("drama".to_string(), 0.5);
        let mut music_genres = HashMap::new();
        music_genres.insert("jazz".to_string(), 0.25);
        let mut cuisines = HashMap::new();
        cuisines.insert("korean".to_string(), 1.0);

        let vector = TasteProfile::build_vector(&movie_genres, &music_genres, &cuisines);

        assert_eq!(vector.len(), TASTE_VECTOR_DIM);
        assert_eq!(vector[2], 0.5); // drama slot
        assert_eq!(vector[13], 0.25); // jazz slot
        assert_eq!(vector[29], 1.0); // korean slot
        assert_eq!(vector.iter().filter(|v| **v != 0.0).count(), 3);
    }

    #[test]
    fn test_build_vector_ignores_unknown_labels() {
        let mut movie_genres = HashMap::new();
        movie_genres.insert("mumblecore".to_string(), 0.9);

        let vector =
            TasteProfile::build_vector(&movie_genres, &HashMap::new(), &HashMap::new());
        assert!(vector.iter().all(|v| *v == 0.0));
    }
}
