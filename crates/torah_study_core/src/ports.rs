//! crates/torah_study_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Language, Reflection, Source, StudySession};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("External service timed out: {0}")]
    Timeout(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The external relational store. The core consumes its results as plain
/// in-memory collections and never manages pagination or caching itself.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every published catalog source, in stable catalog order.
    async fn fetch_published_sources(&self) -> PortResult<Vec<Source>>;

    /// A user's full session and reflection history.
    async fn fetch_user_history(
        &self,
        user_id: Uuid,
    ) -> PortResult<(Vec<StudySession>, Vec<Reflection>)>;

    async fn record_session(&self, session: StudySession) -> PortResult<()>;

    async fn save_reflection(&self, reflection: Reflection) -> PortResult<()>;

    /// Explicit opt-in persistence of an AI-generated source. The
    /// recommendation flow itself never writes catalog entries.
    async fn save_generated_source(&self, source: &Source) -> PortResult<()>;
}

/// The external generation service used when the catalog is exhausted.
/// Returns a raw, loosely-labeled bilingual text blob; the caller hands it
/// to the webhook parser.
#[async_trait]
pub trait SourceGenerationService: Send + Sync {
    async fn generate_source(
        &self,
        time_selected: u32,
        topic: &str,
        language: Language,
    ) -> PortResult<String>;
}
