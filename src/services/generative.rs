use std::fmt::Write as _;
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::EngineResult,
    models::{classify_candidate, Candidate, ContentCategory, RatedItem, RecommendationSource},
    services::providers::{DiscoveryProvider, GenerativeClient},
    store::ContentStore,
};

/// Most recent rated items included in the prompt
const HISTORY_WINDOW: usize = 5;
/// Confidence base for a well-grounded prompt (full history window)
const BASE_RICH_HISTORY: f32 = 0.85;
/// Confidence base with some history
const BASE_SOME_HISTORY: f32 = 0.70;
/// Confidence base for the "no history" prompt
const BASE_NO_HISTORY: f32 = 0.55;
/// Per-position confidence decay down the returned list
const POSITION_PENALTY: f32 = 0.03;
/// Symmetric jitter half-width
const JITTER_SPREAD: f32 = 0.02;
const CONFIDENCE_FLOOR: f32 = 0.30;
const CONFIDENCE_CEILING: f32 = 0.95;

/// Injectable randomness for confidence jitter
///
/// Production uses thread-local entropy; tests pin it to zero so confidence
/// bounds are exact.
pub trait JitterSource: Send + Sync {
    /// A sample in [-1, 1]
    fn sample(&self) -> f32;
}

pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self) -> f32 {
        rand::thread_rng().gen_range(-1.0..=1.0)
    }
}

/// Fixed jitter for deterministic tests
pub struct FixedJitter(pub f32);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f32 {
        self.0
    }
}

/// Asks a generative model for suggestions seeded by recent rated history
///
/// Every failure mode here (timeout, transport error, prose instead of JSON)
/// degrades to an empty candidate list; the caller's fallback chain covers
/// the gap.
pub struct GenerativeRecommender {
    store: Arc<dyn ContentStore>,
    client: Arc<dyn GenerativeClient>,
    /// Poster enrichment for movie/TV candidates; best-effort. Matched to a
    /// candidate's category through `supports`.
    enrichment: Vec<Arc<dyn DiscoveryProvider>>,
    jitter: Arc<dyn JitterSource>,
}

impl GenerativeRecommender {
    pub fn new(
        store: Arc<dyn ContentStore>,
        client: Arc<dyn GenerativeClient>,
        enrichment: Vec<Arc<dyn DiscoveryProvider>>,
        jitter: Arc<dyn JitterSource>,
    ) -> Self {
        Self {
            store,
            client,
            enrichment,
            jitter,
        }
    }

    pub async fn recommend(
        &self,
        user_id: Uuid,
        category: ContentCategory,
        limit: usize,
    ) -> EngineResult<Vec<Candidate>> {
        let mut history = self.store.get_rated_items(user_id, category).await?;
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history.truncate(HISTORY_WINDOW);

        let prompt = build_prompt(category, &history, limit);

        let raw = match self.client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    category = %category,
                    error = %e,
                    client = self.client.name(),
                    "Generative call failed, returning no candidates"
                );
                return Ok(Vec::new());
            }
        };

        let parsed = parse_suggestions(category, &raw);
        if parsed.is_empty() {
            tracing::warn!(
                user_id = %user_id,
                category = %category,
                "Generative response yielded no parseable suggestions"
            );
            return Ok(Vec::new());
        }

        let base = match history.len() {
            0 => BASE_NO_HISTORY,
            n if n >= HISTORY_WINDOW => BASE_RICH_HISTORY,
            _ => BASE_SOME_HISTORY,
        };

        let mut candidates = Vec::new();
        for (position, mut candidate) in parsed.into_iter().enumerate() {
            if self.store.item_exists(user_id, &candidate.key()).await? {
                continue;
            }

            candidate.confidence = self.score(base, position);
            self.enrich_image(&mut candidate).await;
            candidates.push(candidate);
            if candidates.len() >= limit {
                break;
            }
        }

        tracing::info!(
            user_id = %user_id,
            category = %category,
            history = history.len(),
            candidates = candidates.len(),
            "Generative recommendations produced"
        );

        Ok(candidates)
    }

    fn score(&self, base: f32, position: usize) -> f32 {
        let jitter = self.jitter.sample() * JITTER_SPREAD;
        (base - POSITION_PENALTY * position as f32 + jitter)
            .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
    }

    /// Best-effort poster lookup for screen content; never drops the candidate
    async fn enrich_image(&self, candidate: &mut Candidate) {
        if candidate.image_url.is_some() {
            return;
        }
        if !matches!(
            candidate.category,
            ContentCategory::Movie | ContentCategory::TvShow
        ) {
            return;
        }
        let Some(provider) = self
            .enrichment
            .iter()
            .find(|p| p.supports(candidate.category))
        else {
            return;
        };

        match provider.find_image(candidate.category, &candidate.title).await {
            Ok(image_url) => candidate.image_url = image_url,
            Err(e) => {
                tracing::debug!(
                    title = %candidate.title,
                    error = %e,
                    provider = provider.name(),
                    "Image enrichment failed, continuing without poster"
                );
            }
        }
    }
}

/// Build the category-specific prompt
///
/// With history: list the recent items with their fields and ratings and ask
/// for `limit` new picks tied back to them. Without: ask for generally
/// popular, high-quality picks. Either way the response contract is a bare
/// JSON array, one object per suggestion, with a `reason` field.
pub fn build_prompt(category: ContentCategory, history: &[RatedItem], limit: usize) -> String {
    let mut prompt = String::new();

    if history.is_empty() {
        let _ = writeln!(
            prompt,
            "Suggest {} generally popular, critically well-regarded {} for someone with no logged history.",
            limit,
            category.plural()
        );
    } else {
        let _ = writeln!(
            prompt,
            "A user recently rated these {} (most recent first):",
            category.plural()
        );
        for item in history {
            let _ = writeln!(prompt, "- {}", describe_item(item));
        }
        let _ = writeln!(
            prompt,
            "Suggest {} new {} they have not logged, grounded in this taste. Do not repeat anything listed above.",
            limit,
            category.plural()
        );
    }

    let fields = match category {
        ContentCategory::Movie | ContentCategory::TvShow => {
            r#""title", "year" (number), "genre""#
        }
        ContentCategory::Music => r#""title", "artist", "album", "genre""#,
        ContentCategory::Restaurant => r#""name", "cuisine", "location""#,
    };

    let _ = writeln!(
        prompt,
        "Respond with only a JSON array of exactly {} objects, each with {} and a short \"reason\" string explaining the pick{}. No prose outside the array.",
        limit,
        fields,
        if history.is_empty() {
            ""
        } else {
            " in terms of the rated items"
        }
    );

    prompt
}

fn describe_item(item: &RatedItem) -> String {
    let mut parts = vec![item.title.clone()];
    match item.category {
        ContentCategory::Movie | ContentCategory::TvShow => {
            if let Some(year) = item.year {
                parts.push(format!("({})", year));
            }
            if let Some(genre) = &item.genre {
                parts.push(format!("[{}]", genre));
            }
        }
        ContentCategory::Music => {
            if let Some(artist) = &item.artist {
                parts.push(format!("by {}", artist));
            }
            if let Some(genre) = &item.genre {
                parts.push(format!("[{}]", genre));
            }
        }
        ContentCategory::Restaurant => {
            if let Some(cuisine) = &item.cuisine {
                parts.push(format!("[{}]", cuisine));
            }
            if let Some(location) = &item.location {
                parts.push(format!("in {}", location));
            }
        }
    }
    parts.push(format!("rated {:.1}/5", item.rating));
    parts.join(" ")
}

/// Parse a model response into candidates
///
/// Strips markdown fences and wrapper prose by locating the outermost JSON
/// array. A payload that is not a JSON array of objects yields an empty Vec;
/// individual objects the classifier cannot place are skipped with a warning.
pub fn parse_suggestions(category: ContentCategory, raw: &str) -> Vec<Candidate> {
    let Some(payload) = extract_array(raw) else {
        return Vec::new();
    };

    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(payload) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| convert_entry(category, entry))
        .collect()
}

fn extract_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

fn convert_entry(category: ContentCategory, entry: &Value) -> Option<Candidate> {
    let classified = match classify_candidate(Some(category), entry) {
        Some(c) => c,
        None => {
            tracing::warn!(
                category = %category,
                entry = %entry,
                "Skipping generative suggestion of indeterminate category"
            );
            return None;
        }
    };
    if classified != category {
        tracing::warn!(
            requested = %category,
            classified = %classified,
            "Skipping generative suggestion classified outside the requested category"
        );
        return None;
    }

    let title = entry
        .get("title")
        .or_else(|| entry.get("name"))
        .and_then(Value::as_str)?
        .trim()
        .to_string();
    if title.is_empty() {
        return None;
    }

    let get_str = |field: &str| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let reason = get_str("reason").unwrap_or_else(|| "Suggested from your recent taste".to_string());

    // Confidence is assigned by the recommender after ownership filtering
    let mut candidate = Candidate::new(category, title, 0.0, RecommendationSource::Generative, reason);
    candidate.year = entry.get("year").and_then(Value::as_i64).map(|y| y as i32);
    candidate.genre = get_str("genre");
    candidate.artist = get_str("artist");
    candidate.album = get_str("album");
    candidate.cuisine = get_str("cuisine");
    candidate.location = get_str("location");
    Some(candidate)
}
