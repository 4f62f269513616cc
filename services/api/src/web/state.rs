//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use torah_study_core::ports::{ContentStore, SourceGenerationService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub generator: Arc<dyn SourceGenerationService>,
    pub config: Arc<Config>,
}
