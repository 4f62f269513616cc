pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary
// that builds the web server router.
pub use rest::{
    learning_pattern_handler, recommend_handler, record_session_handler,
    save_generated_source_handler, save_reflection_handler,
};
