//! crates/torah_study_core/src/recommend.rs
//!
//! The tiered source recommendation engine. Each tier is attempted only if
//! the previous one yielded zero candidates: primary filter, personalization
//! filter, then a uniform random fallback over the remaining catalog.
//! External generation (tier 4) is the caller's responsibility and is only
//! reached when this engine returns `None`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{
    normalize_topic, DifficultyLevel, LearningPattern, Recommendation, RecommendationRequest,
    RecommendationTier, Source, SourceType,
};
use crate::personalization::{personalization_score, personalized_candidates};
use crate::quality::QualityCache;

//=========================================================================================
// Time-Bucket Policy
//=========================================================================================

/// A minute-range policy bucket controlling which source types and
/// difficulties are eligible for a given time budget.
#[derive(Debug)]
pub struct TimeBucket {
    pub focus: &'static str,
    pub allowed_types: &'static [SourceType],
    pub max_difficulty: DifficultyLevel,
}

const QUICK_INSIGHTS: TimeBucket = TimeBucket {
    focus: "quick_insights",
    allowed_types: &[SourceType::PracticalHalacha, SourceType::TextStudy],
    max_difficulty: DifficultyLevel::Beginner,
};

const STANDARD_STUDY: TimeBucket = TimeBucket {
    focus: "standard_study",
    allowed_types: &[SourceType::TextStudy, SourceType::Philosophical],
    max_difficulty: DifficultyLevel::Intermediate,
};

const COMPLEX_TOPICS: TimeBucket = TimeBucket {
    focus: "complex_topics",
    allowed_types: &[
        SourceType::TextStudy,
        SourceType::Philosophical,
        SourceType::Historical,
    ],
    max_difficulty: DifficultyLevel::Intermediate,
};

const COMPREHENSIVE_STUDY: TimeBucket = TimeBucket {
    focus: "comprehensive_study",
    allowed_types: &[
        SourceType::Philosophical,
        SourceType::Mystical,
        SourceType::Historical,
    ],
    max_difficulty: DifficultyLevel::Advanced,
};

const DEEP_ANALYSIS: TimeBucket = TimeBucket {
    focus: "deep_analysis",
    allowed_types: &[
        SourceType::Mystical,
        SourceType::Philosophical,
        SourceType::Historical,
    ],
    max_difficulty: DifficultyLevel::Advanced,
};

impl TimeBucket {
    pub fn for_minutes(minutes: u32) -> &'static TimeBucket {
        match minutes {
            0..=10 => &QUICK_INSIGHTS,
            11..=20 => &STANDARD_STUDY,
            21..=30 => &COMPLEX_TOPICS,
            31..=45 => &COMPREHENSIVE_STUDY,
            _ => &DEEP_ANALYSIS,
        }
    }

    fn allows(&self, source: &Source) -> bool {
        let weight = source
            .difficulty_level
            .map(|d| d.weight())
            .unwrap_or(DifficultyLevel::Beginner.weight());
        self.allowed_types.contains(&source.source_type) && weight <= self.max_difficulty.weight()
    }
}

//=========================================================================================
// The Engine
//=========================================================================================

/// Topic match is exact or substring-contains in either direction, after
/// normalization.
fn topic_matches(candidate: &str, requested: &str) -> bool {
    let candidate = normalize_topic(candidate);
    let requested = normalize_topic(requested);
    if candidate.is_empty() || requested.is_empty() {
        return false;
    }
    candidate == requested || candidate.contains(&requested) || requested.contains(&candidate)
}

/// The tier-1 primary filter.
fn primary_candidates<'a>(
    catalog: &'a [Source],
    request: &RecommendationRequest,
) -> Vec<&'a Source> {
    let bucket = TimeBucket::for_minutes(request.time_selected);
    catalog
        .iter()
        .filter(|source| source.is_catalog_eligible())
        .filter(|source| {
            topic_matches(&source.category, &request.topic_selected)
                || source
                    .subcategory
                    .as_deref()
                    .map(|sub| topic_matches(sub, &request.topic_selected))
                    .unwrap_or(false)
        })
        .filter(|source| source.accepts_time(request.time_selected))
        .filter(|source| bucket.allows(source))
        .filter(|source| !request.exclude.contains(&source.id))
        .filter(|source| source.language_preference.matches(request.language))
        .filter(|source| primary_quality_predicate(source))
        .collect()
}

/// Tier 1 additionally requires reflection prompts in both languages and a
/// canonical study-text link. Unlike the advisory quality gate, this
/// predicate does filter, but only inside the primary tier.
fn primary_quality_predicate(source: &Source) -> bool {
    let prompt_he_present = source
        .reflection_prompt_he
        .as_deref()
        .map(|p| !p.trim().is_empty())
        .unwrap_or(false);
    !source.reflection_prompt.trim().is_empty() && prompt_he_present && source.has_valid_link()
}

/// Picks the highest-scoring candidate; equal scores keep the earliest
/// catalog position so ties are stable.
fn best_by_score<'a>(
    candidates: Vec<&'a Source>,
    request: &RecommendationRequest,
    pattern: &LearningPattern,
) -> Option<&'a Source> {
    let mut best: Option<(&Source, f64)> = None;
    for source in candidates {
        let score = personalization_score(source, request, pattern);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((source, score)),
        }
    }
    best.map(|(source, _)| source)
}

/// The recommendation engine. Owns a seedable randomness source so the
/// tier-3 fallback is deterministic in tests, and a quality cache so a
/// source is assessed at most once per engine lifetime (sources are
/// immutable within a request context).
pub struct RecommendationEngine {
    rng: StdRng,
    quality_cache: QualityCache,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            quality_cache: QualityCache::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            quality_cache: QualityCache::new(),
        }
    }

    /// Drops all memoized quality assessments, e.g. between unrelated
    /// catalogs when one engine is reused.
    pub fn clear_quality_cache(&mut self) {
        self.quality_cache.clear();
    }

    /// Returns one definitive pick, or `None` when the catalog is exhausted
    /// for this request. Exhaustion is the designed terminal state, not an
    /// error; the caller may then try external generation.
    pub fn recommend(
        &mut self,
        catalog: &[Source],
        request: &RecommendationRequest,
        pattern: &LearningPattern,
    ) -> Option<Recommendation> {
        let primary = primary_candidates(catalog, request);
        if let Some(source) = best_by_score(primary, request, pattern) {
            return Some(self.annotate(source, RecommendationTier::Primary, Vec::new()));
        }

        let personalized = personalized_candidates(catalog, request, pattern);
        if let Some(source) = best_by_score(personalized, request, pattern) {
            return Some(self.annotate(source, RecommendationTier::Personalized, Vec::new()));
        }

        let remaining: Vec<&Source> = catalog
            .iter()
            .filter(|source| source.is_catalog_eligible())
            .filter(|source| !request.exclude.contains(&source.id))
            .collect();
        if remaining.is_empty() {
            return None;
        }
        let source = remaining[self.rng.gen_range(0..remaining.len())];
        let warning = format!(
            "no source matched topic '{}' within {} minutes; offering an unfiltered pick",
            request.topic_selected, request.time_selected
        );
        Some(self.annotate(source, RecommendationTier::RandomFallback, vec![warning]))
    }

    /// Skip semantics: record the skipped id into the exclusion set, then
    /// re-run the full tiered algorithm. The exclusion set only grows, so
    /// repeated skips converge to `None` within catalog-size calls.
    pub fn skip(
        &mut self,
        catalog: &[Source],
        request: &mut RecommendationRequest,
        skipped: uuid::Uuid,
        pattern: &LearningPattern,
    ) -> Option<Recommendation> {
        request.exclude.insert(skipped);
        self.recommend(catalog, request, pattern)
    }

    /// Attaches the advisory quality warnings to a chosen source. The
    /// quality score never blocks selection in tiers 1-3.
    fn annotate(
        &mut self,
        source: &Source,
        tier: RecommendationTier,
        mut warnings: Vec<String>,
    ) -> Recommendation {
        let report = self.quality_cache.assess(source);
        if report.is_flagged() {
            warnings.extend(report.warnings.iter().cloned());
        }
        Recommendation {
            source: source.clone(),
            tier,
            warnings,
        }
    }
}
