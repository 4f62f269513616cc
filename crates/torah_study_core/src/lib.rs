pub mod commentary;
pub mod domain;
pub mod personalization;
pub mod ports;
pub mod quality;
pub mod recommend;
pub mod webhook;

pub use domain::{
    CommentaryConfig, DifficultyLevel, Language, LanguagePreference, LearningPattern,
    ParsedWebhookSource, Recommendation, RecommendationRequest, RecommendationTier, Reflection,
    Source, SourceType, StudySession,
};
pub use ports::{ContentStore, PortError, PortResult, SourceGenerationService};
pub use recommend::{RecommendationEngine, TimeBucket};
pub use webhook::WebhookParser;
