//! crates/torah_study_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; they
//! derive `serde` traits only because they cross the REST boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// The canonical host that every valid study-text link must point at.
pub const SEFARIA_DOMAIN: &str = "sefaria.org";

/// Normalizes a topic key for matching: lowercased, trimmed, and with
/// Hebrew pointing (niqqud and cantillation, U+0591..U+05C7) removed so
/// that vocalized and unvocalized spellings compare equal.
pub fn normalize_topic(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !('\u{0591}'..='\u{05C7}').contains(c))
        .collect()
}

/// A study language requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    He,
}

/// The languages a source is suitable for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePreference {
    Both,
    En,
    He,
}

impl LanguagePreference {
    /// Whether a source with this preference can serve a request in `language`.
    pub fn matches(&self, language: Language) -> bool {
        match self {
            LanguagePreference::Both => true,
            LanguagePreference::En => language == Language::En,
            LanguagePreference::He => language == Language::He,
        }
    }
}

/// Difficulty tier of a source, ordered beginner < intermediate < advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    /// Numeric ordering weight used by the time-bucket policy.
    pub fn weight(&self) -> u8 {
        match self {
            DifficultyLevel::Beginner => 1,
            DifficultyLevel::Intermediate => 2,
            DifficultyLevel::Advanced => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl std::str::FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(format!("'{}' is not a difficulty level", other)),
        }
    }
}

/// The broad genre of a study source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    TextStudy,
    PracticalHalacha,
    Philosophical,
    Historical,
    Mystical,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::TextStudy => "text_study",
            SourceType::PracticalHalacha => "practical_halacha",
            SourceType::Philosophical => "philosophical",
            SourceType::Historical => "historical",
            SourceType::Mystical => "mystical",
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text_study" => Ok(SourceType::TextStudy),
            "practical_halacha" => Ok(SourceType::PracticalHalacha),
            "philosophical" => Ok(SourceType::Philosophical),
            "historical" => Ok(SourceType::Historical),
            "mystical" => Ok(SourceType::Mystical),
            other => Err(format!("'{}' is not a source type", other)),
        }
    }
}

/// A single citable study text with bilingual metadata and timing tags.
///
/// A `Source` is immutable once fetched into a request context. Rows that
/// fail `is_catalog_eligible` are silently absent from recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub title: String,
    pub title_he: Option<String>,
    pub text_excerpt: Option<String>,
    pub text_excerpt_he: Option<String>,
    pub reflection_prompt: String,
    pub reflection_prompt_he: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub source_type: SourceType,
    /// Minutes of study this source is sized for. Always > 0.
    pub estimated_time: u32,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    pub start_ref: Option<String>,
    pub end_ref: Option<String>,
    pub sefaria_link: Option<String>,
    pub commentaries: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub prerequisites: Vec<String>,
    pub language_preference: LanguagePreference,
    pub published: bool,
    pub ai_generated: bool,
}

impl Source {
    /// The effective `[min, max]` minute window. Missing bounds derive as
    /// five minutes either side of the estimate, floored at one minute.
    pub fn effective_time_range(&self) -> (u32, u32) {
        let min = self
            .min_time
            .unwrap_or_else(|| self.estimated_time.saturating_sub(5).max(1));
        let max = self.max_time.unwrap_or(self.estimated_time + 5);
        (min, max)
    }

    pub fn accepts_time(&self, minutes: u32) -> bool {
        let (min, max) = self.effective_time_range();
        minutes >= min && minutes <= max
    }

    /// Whether the canonical link points at the expected text-source host.
    pub fn has_valid_link(&self) -> bool {
        self.sefaria_link
            .as_deref()
            .map(|link| link.contains(SEFARIA_DOMAIN))
            .unwrap_or(false)
    }

    /// Required-field gate: rows missing a title, prompt, or category are
    /// never considered for recommendation.
    pub fn is_catalog_eligible(&self) -> bool {
        self.published
            && !self.title.trim().is_empty()
            && !self.reflection_prompt.trim().is_empty()
            && !self.category.trim().is_empty()
            && self.estimated_time > 0
    }
}

/// Ephemeral input to one recommendation call.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    /// Minutes the user has available, typically 5-60.
    pub time_selected: u32,
    /// Free-form topic key, matched case/diacritic-insensitively.
    pub topic_selected: String,
    pub language: Language,
    /// Ids already shown this session, never re-offered.
    #[serde(default)]
    pub exclude: HashSet<Uuid>,
}

/// One recorded study session, the unit of learning history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_id: Option<Uuid>,
    pub topic: String,
    pub time_selected: u32,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
}

/// A free-text reflection written after a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A recomputed-on-demand projection of a user's session and reflection
/// history into preference weights. Has no independent persistence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LearningPattern {
    /// Normalized topic -> number of sessions on that topic.
    pub preferred_topics: HashMap<String, u32>,
    /// Minutes selected -> number of sessions with that selection.
    pub time_preferences: HashMap<u32, u32>,
    pub difficulty_progression: Option<DifficultyLevel>,
    /// Normalized topic -> completed / total ratio in [0, 1].
    pub completion_rates: HashMap<String, f64>,
    /// The 3 most frequent past time selections, most frequent first.
    pub optimal_study_times: Vec<u32>,
    /// Consecutive calendar days with at least one session, counted back
    /// from the most recent session day.
    pub current_streak: u32,
    /// The longest such run anywhere in the history.
    pub longest_streak: u32,
}

impl LearningPattern {
    /// The user's current tier, defaulting to beginner for new users.
    pub fn difficulty_tier(&self) -> DifficultyLevel {
        self.difficulty_progression
            .unwrap_or(DifficultyLevel::Beginner)
    }
}

/// Which fallback stage produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Primary,
    Personalized,
    RandomFallback,
    Generated,
}

/// The engine's definitive pick plus advisory annotations.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub source: Source,
    pub tier: RecommendationTier,
    /// Advisory only. Quality warnings never block selection.
    pub warnings: Vec<String>,
}

/// Pure input tuple for commentary classification. Carries no state.
#[derive(Debug, Clone)]
pub struct CommentaryConfig {
    pub topic_selected: String,
    pub source_title: String,
    pub source_range: String,
    pub excerpt: String,
}

/// The webhook parser's output: a partial `Source` with a flattened,
/// human-readable reference range instead of separate start/end refs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedWebhookSource {
    pub title: String,
    pub title_he: Option<String>,
    pub source_range: String,
    pub text_excerpt: Option<String>,
    pub text_excerpt_he: Option<String>,
    pub reflection_prompt: Option<String>,
    pub reflection_prompt_he: Option<String>,
    pub commentaries: Vec<String>,
    pub estimated_time: u32,
    pub sefaria_link: String,
    /// True when the title came from an explicit label or the range, not
    /// the generic placeholder.
    pub title_recovered: bool,
}

impl ParsedWebhookSource {
    /// The parse failed only if title, range, and excerpt were all
    /// simultaneously unrecoverable. Anything less degrades per-field.
    pub fn is_usable(&self) -> bool {
        self.title_recovered
            || !self.source_range.is_empty()
            || self
                .text_excerpt
                .as_deref()
                .map(|t| !t.is_empty())
                .unwrap_or(false)
    }

    /// Builds an `ai_generated` Source for immediate display. Returns `None`
    /// when the required fields cannot be filled, making the record
    /// ineligible for recommendation. Generated sources are never persisted
    /// as catalog entries unless explicitly saved.
    pub fn into_source(
        self,
        topic: &str,
        source_type: SourceType,
        difficulty: DifficultyLevel,
    ) -> Option<Source> {
        let reflection_prompt = self.reflection_prompt.filter(|p| !p.trim().is_empty())?;
        if self.title.trim().is_empty() || topic.trim().is_empty() {
            return None;
        }

        // A range synthesized from a from/to pair splits back into refs.
        let (start_ref, end_ref) = match self.source_range.split_once(" to ") {
            Some((start, end)) => (Some(start.to_string()), Some(end.to_string())),
            None if self.source_range.is_empty() => (None, None),
            None => (Some(self.source_range.clone()), None),
        };

        Some(Source {
            id: Uuid::new_v4(),
            title: self.title,
            title_he: self.title_he,
            text_excerpt: self.text_excerpt,
            text_excerpt_he: self.text_excerpt_he,
            reflection_prompt,
            reflection_prompt_he: self.reflection_prompt_he,
            category: topic.to_string(),
            subcategory: None,
            difficulty_level: Some(difficulty),
            source_type,
            estimated_time: self.estimated_time.max(1),
            min_time: None,
            max_time: None,
            start_ref,
            end_ref,
            sefaria_link: if self.sefaria_link.is_empty() {
                None
            } else {
                Some(self.sefaria_link)
            },
            commentaries: self.commentaries,
            learning_objectives: Vec::new(),
            prerequisites: Vec::new(),
            language_preference: LanguagePreference::Both,
            published: false,
            ai_generated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(reflection: Option<&str>) -> ParsedWebhookSource {
        ParsedWebhookSource {
            title: "Creation".to_string(),
            title_he: None,
            source_range: "Genesis 1:1 to Genesis 1:2".to_string(),
            text_excerpt: Some("In the beginning.".to_string()),
            text_excerpt_he: None,
            reflection_prompt: reflection.map(str::to_string),
            reflection_prompt_he: None,
            commentaries: vec!["Rashi".to_string(), "Ramban".to_string()],
            estimated_time: 15,
            sefaria_link: String::new(),
            title_recovered: true,
        }
    }

    #[test]
    fn missing_time_bounds_derive_from_the_estimate() {
        let source = parsed(Some("Why light first?"))
            .into_source("Torah", SourceType::TextStudy, DifficultyLevel::Beginner)
            .unwrap();
        assert_eq!(source.effective_time_range(), (10, 20));
        assert!(source.accepts_time(10));
        assert!(!source.accepts_time(21));

        // A tiny estimate floors the lower bound at one minute.
        let mut short = source.clone();
        short.estimated_time = 3;
        assert_eq!(short.effective_time_range(), (1, 8));
    }

    #[test]
    fn parsed_record_without_a_prompt_makes_no_source() {
        assert!(parsed(None)
            .into_source("Torah", SourceType::TextStudy, DifficultyLevel::Beginner)
            .is_none());
        assert!(parsed(Some("  "))
            .into_source("Torah", SourceType::TextStudy, DifficultyLevel::Beginner)
            .is_none());
    }

    #[test]
    fn synthesized_range_splits_back_into_refs() {
        let source = parsed(Some("What changed?"))
            .into_source("Torah", SourceType::TextStudy, DifficultyLevel::Beginner)
            .unwrap();
        assert_eq!(source.start_ref.as_deref(), Some("Genesis 1:1"));
        assert_eq!(source.end_ref.as_deref(), Some("Genesis 1:2"));
        assert!(source.ai_generated);
        assert!(!source.published);
    }

    #[test]
    fn topic_normalization_is_case_and_niqqud_insensitive() {
        assert_eq!(normalize_topic("  Halacha "), "halacha");
        // Vocalized and bare spellings of the same word compare equal.
        assert_eq!(normalize_topic("תּוֹרָה"), normalize_topic("תורה"));
    }
}
