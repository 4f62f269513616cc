pub mod db;
pub mod generation_llm;

pub use db::PgStore;
pub use generation_llm::OpenAiGenerationAdapter;
