//! crates/torah_study_core/src/quality.rs
//!
//! Lightweight structural validation of a candidate source. The gate is
//! advisory only: it produces a 0-100 completeness score and warning strings,
//! and never blocks selection.

use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::Source;

/// Scores below this threshold surface all warnings to the caller.
pub const QUALITY_WARNING_THRESHOLD: u8 = 60;

const CHECK_COUNT: u32 = 6;

/// The outcome of the six structural checks for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    /// `passed_checks * 100 / 6`, so a fully complete source scores 100.
    pub score: u8,
    pub valid_link: bool,
    pub bilingual_complete: bool,
    pub prompts_present: bool,
    pub valid_time_range: bool,
    pub difficulty_assigned: bool,
    pub excerpt_present: bool,
    pub warnings: Vec<String>,
}

impl QualityReport {
    pub fn is_flagged(&self) -> bool {
        self.score < QUALITY_WARNING_THRESHOLD || !self.warnings.is_empty()
    }
}

/// Runs the six boolean checks against a source.
pub fn assess_quality(source: &Source) -> QualityReport {
    let valid_link = source.has_valid_link();

    let has = |text: &Option<String>| text.as_deref().map(|t| !t.trim().is_empty()).unwrap_or(false);

    let bilingual_complete = has(&source.title_he) && has(&source.text_excerpt_he);
    let prompts_present =
        !source.reflection_prompt.trim().is_empty() && has(&source.reflection_prompt_he);

    let (min, max) = source.effective_time_range();
    let valid_time_range =
        source.estimated_time > 0 && min <= source.estimated_time && source.estimated_time <= max;

    let difficulty_assigned = source.difficulty_level.is_some();
    let excerpt_present = has(&source.text_excerpt);

    let mut warnings = Vec::new();
    if !valid_link {
        warnings.push(format!("source '{}' has no valid study-text link", source.title));
    }
    if !bilingual_complete {
        warnings.push(format!("source '{}' is missing Hebrew text fields", source.title));
    }
    if !prompts_present {
        warnings.push(format!(
            "source '{}' is missing a reflection prompt in one language",
            source.title
        ));
    }
    if !valid_time_range {
        warnings.push(format!("source '{}' has an inconsistent time range", source.title));
    }
    if !difficulty_assigned {
        warnings.push(format!("source '{}' has no difficulty level", source.title));
    }
    if !excerpt_present {
        warnings.push(format!("source '{}' has no text excerpt", source.title));
    }

    let passed = [
        valid_link,
        bilingual_complete,
        prompts_present,
        valid_time_range,
        difficulty_assigned,
        excerpt_present,
    ]
    .iter()
    .filter(|&&check| check)
    .count() as u32;

    QualityReport {
        score: (passed * 100 / CHECK_COUNT) as u8,
        valid_link,
        bilingual_complete,
        prompts_present,
        valid_time_range,
        difficulty_assigned,
        excerpt_present,
        warnings,
    }
}

/// Caller-owned memoization of quality assessments, keyed by source id.
///
/// Sources are immutable within a request context, so one assessment per id
/// is enough. The cache is explicit state owned by the caller, with
/// `clear()` for test isolation; there is no process-wide cache.
#[derive(Debug, Default)]
pub struct QualityCache {
    reports: HashMap<Uuid, QualityReport>,
}

impl QualityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assess(&mut self, source: &Source) -> &QualityReport {
        self.reports
            .entry(source.id)
            .or_insert_with(|| assess_quality(source))
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DifficultyLevel, LanguagePreference, SourceType};

    fn complete_source() -> Source {
        Source {
            id: Uuid::new_v4(),
            title: "Laws of Shabbat Candles".to_string(),
            title_he: Some("הלכות נרות שבת".to_string()),
            text_excerpt: Some("One must light candles before sunset.".to_string()),
            text_excerpt_he: Some("יש להדליק נרות לפני השקיעה.".to_string()),
            reflection_prompt: "How does light change a space?".to_string(),
            reflection_prompt_he: Some("כיצד האור משנה את החלל?".to_string()),
            category: "Halacha".to_string(),
            subcategory: None,
            difficulty_level: Some(DifficultyLevel::Beginner),
            source_type: SourceType::PracticalHalacha,
            estimated_time: 10,
            min_time: Some(5),
            max_time: Some(15),
            start_ref: Some("Shulchan Aruch, Orach Chaim 263:1".to_string()),
            end_ref: None,
            sefaria_link: Some("https://www.sefaria.org/Shulchan_Arukh,_Orach_Chayim.263.1".to_string()),
            commentaries: vec!["Mishnah Berurah".to_string()],
            learning_objectives: Vec::new(),
            prerequisites: Vec::new(),
            language_preference: LanguagePreference::Both,
            published: true,
            ai_generated: false,
        }
    }

    #[test]
    fn complete_source_scores_100() {
        let report = assess_quality(&complete_source());
        assert_eq!(report.score, 100);
        assert!(report.warnings.is_empty());
        assert!(!report.is_flagged());
    }

    #[test]
    fn each_missing_check_drops_the_score() {
        let mut source = complete_source();
        source.sefaria_link = Some("https://example.com/not-canonical".to_string());
        let report = assess_quality(&source);
        assert!(!report.valid_link);
        assert_eq!(report.score, 83); // 5 of 6, integer division

        source.text_excerpt_he = None;
        let report = assess_quality(&source);
        assert_eq!(report.score, 66);
        assert!(report.warnings.len() >= 2);
    }

    #[test]
    fn sparse_source_is_flagged_but_never_errors() {
        let mut source = complete_source();
        source.sefaria_link = None;
        source.title_he = None;
        source.text_excerpt = None;
        source.text_excerpt_he = None;
        source.reflection_prompt_he = None;
        source.difficulty_level = None;
        let report = assess_quality(&source);
        assert_eq!(report.score, 16); // only the time range passes
        assert!(report.is_flagged());
    }

    #[test]
    fn inverted_time_bounds_fail_the_range_check() {
        let mut source = complete_source();
        source.min_time = Some(20);
        source.max_time = Some(10);
        let report = assess_quality(&source);
        assert!(!report.valid_time_range);
    }

    #[test]
    fn cache_memoizes_by_id_and_clears() {
        let source = complete_source();
        let mut cache = QualityCache::new();
        assert_eq!(cache.assess(&source).score, 100);
        assert_eq!(cache.len(), 1);

        // Same id is not re-assessed even if the struct were to differ.
        let mut altered = source.clone();
        altered.sefaria_link = None;
        assert_eq!(cache.assess(&altered).score, 100);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.assess(&altered).score, 83);
    }
}
