//! crates/torah_study_core/src/personalization.rs
//!
//! The learning-pattern model: a pure aggregation over a user's session and
//! reflection history, recomputed in full on every analysis pass. Feeds the
//! recommendation engine's secondary ranking and its tier-2 filter.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

use crate::domain::{
    normalize_topic, DifficultyLevel, LearningPattern, RecommendationRequest, Reflection, Source,
    StudySession,
};

/// Completed-session count required before a user leaves the beginner tier.
const INTERMEDIATE_SESSION_GATE: usize = 10;
/// Completed-session and reflection counts required for the advanced tier.
/// Raw lifetime counts with no decay; the tier never regresses.
const ADVANCED_SESSION_GATE: usize = 25;
const ADVANCED_REFLECTION_GATE: usize = 15;

/// Rebuilds the full learning pattern from history.
pub fn analyze_learning_pattern(
    sessions: &[StudySession],
    reflections: &[Reflection],
) -> LearningPattern {
    let mut preferred_topics: HashMap<String, u32> = HashMap::new();
    let mut time_preferences: HashMap<u32, u32> = HashMap::new();
    let mut per_topic_totals: HashMap<String, (u32, u32)> = HashMap::new();

    for session in sessions {
        let topic = normalize_topic(&session.topic);
        *preferred_topics.entry(topic.clone()).or_insert(0) += 1;
        *time_preferences.entry(session.time_selected).or_insert(0) += 1;

        let (completed, total) = per_topic_totals.entry(topic).or_insert((0, 0));
        *total += 1;
        if session.completed {
            *completed += 1;
        }
    }

    let completion_rates = per_topic_totals
        .into_iter()
        .map(|(topic, (completed, total))| (topic, f64::from(completed) / f64::from(total)))
        .collect();

    let completed_count = sessions.iter().filter(|s| s.completed).count();
    let difficulty_progression =
        if completed_count > ADVANCED_SESSION_GATE && reflections.len() > ADVANCED_REFLECTION_GATE {
            DifficultyLevel::Advanced
        } else if completed_count > INTERMEDIATE_SESSION_GATE {
            DifficultyLevel::Intermediate
        } else {
            DifficultyLevel::Beginner
        };

    let optimal_study_times = top_study_times(&time_preferences);
    let (current_streak, longest_streak) = streaks(sessions);

    LearningPattern {
        preferred_topics,
        time_preferences,
        difficulty_progression: Some(difficulty_progression),
        completion_rates,
        optimal_study_times,
        current_streak,
        longest_streak,
    }
}

/// The 3 most frequent time selections, sorted descending by frequency.
/// Equal frequencies break toward the shorter selection so the result is
/// deterministic.
fn top_study_times(time_preferences: &HashMap<u32, u32>) -> Vec<u32> {
    let mut counted: Vec<(u32, u32)> = time_preferences
        .iter()
        .map(|(&minutes, &count)| (minutes, count))
        .collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counted.into_iter().take(3).map(|(minutes, _)| minutes).collect()
}

/// Current and longest streaks of consecutive calendar days with at least
/// one session. The current streak walks newest-first from the most recent
/// session day and breaks on the first gap; the longest streak is the
/// maximum run over the full history.
fn streaks(sessions: &[StudySession]) -> (u32, u32) {
    let mut days: Vec<NaiveDate> = sessions
        .iter()
        .map(|s| s.started_at.date_naive())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if days.is_empty() {
        return (0, 0);
    }
    days.sort_unstable_by(|a, b| b.cmp(a));

    let mut current = 1u32;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            current += 1;
        } else {
            break;
        }
    }

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    (current, longest)
}

/// Percentage change in session count between the most recent `window_days`
/// window and the window immediately preceding it. A prior window with zero
/// sessions yields 100 when the recent window is non-empty, else 0; this is
/// the documented divide-by-zero convention, not an approximation.
pub fn growth_rate(sessions: &[StudySession], now: DateTime<Utc>, window_days: i64) -> f64 {
    let window = Duration::days(window_days);
    let recent_start = now - window;
    let prior_start = now - window - window;

    let recent = sessions
        .iter()
        .filter(|s| s.started_at > recent_start && s.started_at <= now)
        .count();
    let prior = sessions
        .iter()
        .filter(|s| s.started_at > prior_start && s.started_at <= recent_start)
        .count();

    if prior == 0 {
        if recent > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        (recent as f64 - prior as f64) / prior as f64 * 100.0
    }
}

/// Consistency score in [0, 100]. Users with fewer than 7 total sessions
/// score 10 points per session; established users score by the share of the
/// last 30 calendar days that saw at least one session.
pub fn consistency_score(sessions: &[StudySession], now: DateTime<Utc>) -> f64 {
    if sessions.len() < 7 {
        return (sessions.len() * 10) as f64;
    }
    let cutoff = now - Duration::days(30);
    let active_days: HashSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.started_at > cutoff && s.started_at <= now)
        .map(|s| s.started_at.date_naive())
        .collect();
    (active_days.len() as f64 / 30.0 * 100.0).min(100.0)
}

/// Tier-2 candidate filter: relaxes the primary topic/time matching to
/// category equality, the source's own time window, language, and a
/// difficulty no higher than the user's progression tier.
pub fn personalized_candidates<'a>(
    catalog: &'a [Source],
    request: &RecommendationRequest,
    pattern: &LearningPattern,
) -> Vec<&'a Source> {
    let topic = normalize_topic(&request.topic_selected);
    let tier_weight = pattern.difficulty_tier().weight();

    catalog
        .iter()
        .filter(|source| source.is_catalog_eligible())
        .filter(|source| !request.exclude.contains(&source.id))
        .filter(|source| normalize_topic(&source.category) == topic)
        .filter(|source| source.accepts_time(request.time_selected))
        .filter(|source| source.language_preference.matches(request.language))
        .filter(|source| {
            source
                .difficulty_level
                .map(|d| d.weight())
                .unwrap_or(DifficultyLevel::Beginner.weight())
                <= tier_weight
        })
        .collect()
}

/// The hand-tuned linear ranking score. The weights (2, 1.5, 3, 2, 1) and
/// additive structure are a preserved contract; relative tie-breaking
/// depends on the specific magnitudes.
pub fn personalization_score(
    source: &Source,
    request: &RecommendationRequest,
    pattern: &LearningPattern,
) -> f64 {
    let category = normalize_topic(&source.category);

    let topic_count = pattern.preferred_topics.get(&category).copied().unwrap_or(0);
    let time_count = pattern
        .time_preferences
        .get(&source.estimated_time)
        .copied()
        .unwrap_or(0);
    let difficulty_match = source.difficulty_level == Some(pattern.difficulty_tier());
    let completion_rate = pattern.completion_rates.get(&category).copied().unwrap_or(0.0);
    let optimal_time = pattern.optimal_study_times.contains(&request.time_selected);

    2.0 * f64::from(topic_count)
        + 1.5 * f64::from(time_count)
        + if difficulty_match { 3.0 } else { 0.0 }
        + 2.0 * completion_rate
        + if optimal_time { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, LanguagePreference, SourceType};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn session(topic: &str, minutes: u32, completed: bool, day: u32) -> StudySession {
        StudySession {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            source_id: None,
            topic: topic.to_string(),
            time_selected: minutes,
            completed,
            started_at: Utc.with_ymd_and_hms(2025, 3, day, 8, 0, 0).unwrap(),
        }
    }

    fn reflection(n: u32) -> Reflection {
        Reflection {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            session_id: Uuid::nil(),
            text: format!("thought {}", n),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn tallies_topics_and_times() {
        let sessions = vec![
            session("Halacha", 15, true, 1),
            session("halacha", 15, false, 2),
            session("Mussar", 30, true, 3),
        ];
        let pattern = analyze_learning_pattern(&sessions, &[]);
        assert_eq!(pattern.preferred_topics.get("halacha"), Some(&2));
        assert_eq!(pattern.time_preferences.get(&15), Some(&2));
        assert_eq!(pattern.completion_rates.get("halacha"), Some(&0.5));
        assert_eq!(pattern.completion_rates.get("mussar"), Some(&1.0));
    }

    #[test]
    fn difficulty_gates_use_raw_counts() {
        let few: Vec<StudySession> = (1..=5).map(|d| session("a", 10, true, d)).collect();
        assert_eq!(
            analyze_learning_pattern(&few, &[]).difficulty_progression,
            Some(DifficultyLevel::Beginner)
        );

        let eleven: Vec<StudySession> = (1..=11).map(|d| session("a", 10, true, d)).collect();
        assert_eq!(
            analyze_learning_pattern(&eleven, &[]).difficulty_progression,
            Some(DifficultyLevel::Intermediate)
        );

        // 26 completed sessions alone is not enough without reflections.
        let many: Vec<StudySession> = (1..=26).map(|d| session("a", 10, true, d)).collect();
        assert_eq!(
            analyze_learning_pattern(&many, &[]).difficulty_progression,
            Some(DifficultyLevel::Intermediate)
        );

        let reflections: Vec<Reflection> = (0..16).map(reflection).collect();
        assert_eq!(
            analyze_learning_pattern(&many, &reflections).difficulty_progression,
            Some(DifficultyLevel::Advanced)
        );
    }

    #[test]
    fn optimal_times_are_top_three_by_frequency() {
        let mut sessions = Vec::new();
        for _ in 0..4 {
            sessions.push(session("a", 15, true, 1));
        }
        for _ in 0..3 {
            sessions.push(session("a", 30, true, 2));
        }
        for _ in 0..2 {
            sessions.push(session("a", 10, true, 3));
        }
        sessions.push(session("a", 45, true, 4));

        let pattern = analyze_learning_pattern(&sessions, &[]);
        assert_eq!(pattern.optimal_study_times, vec![15, 30, 10]);
    }

    #[test]
    fn streaks_break_on_gaps() {
        // Days 10-12 consecutive, then a gap, then days 1-5 consecutive.
        let mut sessions: Vec<StudySession> =
            (10..=12).map(|d| session("a", 10, true, d)).collect();
        sessions.extend((1..=5).map(|d| session("a", 10, true, d)));

        let pattern = analyze_learning_pattern(&sessions, &[]);
        assert_eq!(pattern.current_streak, 3);
        assert_eq!(pattern.longest_streak, 5);
    }

    #[test]
    fn growth_rate_divide_by_zero_convention() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();

        assert_eq!(growth_rate(&[], now, 7), 0.0);

        let only_recent = vec![session("a", 10, true, 12)];
        assert_eq!(growth_rate(&only_recent, now, 7), 100.0);

        // 2 prior-window sessions, 3 recent-window sessions: +50%.
        let mut sessions = vec![session("a", 10, true, 2), session("a", 10, true, 3)];
        sessions.extend([
            session("a", 10, true, 10),
            session("a", 10, true, 11),
            session("a", 10, true, 12),
        ]);
        assert_eq!(growth_rate(&sessions, now, 7), 50.0);
    }

    #[test]
    fn consistency_score_has_two_regimes() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();

        let three: Vec<StudySession> = (1..=3).map(|d| session("a", 10, true, d)).collect();
        assert_eq!(consistency_score(&three, now), 30.0);

        // 10 distinct days within the last 30.
        let ten: Vec<StudySession> = (5..=14).map(|d| session("a", 10, true, d)).collect();
        let score = consistency_score(&ten, now);
        assert!((score - (10.0 / 30.0 * 100.0)).abs() < 1e-9);
    }

    fn catalog_source(category: &str, difficulty: DifficultyLevel, minutes: u32) -> Source {
        Source {
            id: Uuid::new_v4(),
            title: format!("{} study", category),
            title_he: None,
            text_excerpt: None,
            text_excerpt_he: None,
            reflection_prompt: "What stands out?".to_string(),
            reflection_prompt_he: None,
            category: category.to_string(),
            subcategory: None,
            difficulty_level: Some(difficulty),
            source_type: SourceType::TextStudy,
            estimated_time: minutes,
            min_time: None,
            max_time: None,
            start_ref: None,
            end_ref: None,
            sefaria_link: None,
            commentaries: Vec::new(),
            learning_objectives: Vec::new(),
            prerequisites: Vec::new(),
            language_preference: LanguagePreference::Both,
            published: true,
            ai_generated: false,
        }
    }

    #[test]
    fn tier_two_filter_uses_category_equality_not_substring() {
        let catalog = vec![
            catalog_source("Halacha", DifficultyLevel::Beginner, 15),
            catalog_source("Halacha Basics", DifficultyLevel::Beginner, 15),
        ];
        let request = RecommendationRequest {
            time_selected: 15,
            topic_selected: "halacha".to_string(),
            language: Language::En,
            exclude: Default::default(),
        };
        let pattern = LearningPattern::default();
        let candidates = personalized_candidates(&catalog, &request, &pattern);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].category, "Halacha");
    }

    #[test]
    fn tier_two_filter_caps_difficulty_at_progression() {
        let catalog = vec![
            catalog_source("Halacha", DifficultyLevel::Beginner, 15),
            catalog_source("Halacha", DifficultyLevel::Advanced, 15),
        ];
        let request = RecommendationRequest {
            time_selected: 15,
            topic_selected: "Halacha".to_string(),
            language: Language::En,
            exclude: Default::default(),
        };
        let pattern = LearningPattern::default();
        let candidates = personalized_candidates(&catalog, &request, &pattern);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].difficulty_level,
            Some(DifficultyLevel::Beginner)
        );
    }

    #[test]
    fn score_uses_the_fixed_weights() {
        let source = catalog_source("Halacha", DifficultyLevel::Beginner, 15);
        let request = RecommendationRequest {
            time_selected: 15,
            topic_selected: "Halacha".to_string(),
            language: Language::En,
            exclude: Default::default(),
        };
        let mut pattern = LearningPattern::default();
        pattern.preferred_topics.insert("halacha".to_string(), 4);
        pattern.time_preferences.insert(15, 2);
        pattern.difficulty_progression = Some(DifficultyLevel::Beginner);
        pattern.completion_rates.insert("halacha".to_string(), 0.5);
        pattern.optimal_study_times = vec![15, 30];

        // 2*4 + 1.5*2 + 3 + 2*0.5 + 1 = 16
        let score = personalization_score(&source, &request, &pattern);
        assert!((score - 16.0).abs() < 1e-9);
    }
}
