//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ContentStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use torah_study_core::domain::{
    DifficultyLevel, LanguagePreference, Reflection, Source, SourceType, StudySession,
};
use torah_study_core::ports::{ContentStore, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ContentStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SourceRecord {
    id: Uuid,
    title: String,
    title_he: Option<String>,
    text_excerpt: Option<String>,
    text_excerpt_he: Option<String>,
    reflection_prompt: String,
    reflection_prompt_he: Option<String>,
    category: String,
    subcategory: Option<String>,
    difficulty_level: Option<String>,
    source_type: String,
    estimated_time: i32,
    min_time: Option<i32>,
    max_time: Option<i32>,
    start_ref: Option<String>,
    end_ref: Option<String>,
    sefaria_link: Option<String>,
    commentaries: Vec<String>,
    learning_objectives: Vec<String>,
    prerequisites: Vec<String>,
    language_preference: String,
    published: bool,
    ai_generated: bool,
}

impl SourceRecord {
    /// Invalid or missing classification columns are silently defaulted;
    /// required-field violations are filtered later by the eligibility gate.
    fn to_domain(self) -> Source {
        Source {
            id: self.id,
            title: self.title,
            title_he: self.title_he,
            text_excerpt: self.text_excerpt,
            text_excerpt_he: self.text_excerpt_he,
            reflection_prompt: self.reflection_prompt,
            reflection_prompt_he: self.reflection_prompt_he,
            category: self.category,
            subcategory: self.subcategory,
            difficulty_level: self
                .difficulty_level
                .and_then(|level| level.parse::<DifficultyLevel>().ok()),
            source_type: self
                .source_type
                .parse::<SourceType>()
                .unwrap_or(SourceType::TextStudy),
            estimated_time: self.estimated_time.max(0) as u32,
            min_time: self.min_time.map(|t| t.max(0) as u32),
            max_time: self.max_time.map(|t| t.max(0) as u32),
            start_ref: self.start_ref,
            end_ref: self.end_ref,
            sefaria_link: self.sefaria_link,
            commentaries: self.commentaries,
            learning_objectives: self.learning_objectives,
            prerequisites: self.prerequisites,
            language_preference: match self.language_preference.as_str() {
                "en" => LanguagePreference::En,
                "he" => LanguagePreference::He,
                _ => LanguagePreference::Both,
            },
            published: self.published,
            ai_generated: self.ai_generated,
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: Uuid,
    source_id: Option<Uuid>,
    topic: String,
    time_selected: i32,
    completed: bool,
    started_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> StudySession {
        StudySession {
            id: self.id,
            user_id: self.user_id,
            source_id: self.source_id,
            topic: self.topic,
            time_selected: self.time_selected.max(0) as u32,
            completed: self.completed,
            started_at: self.started_at,
        }
    }
}

#[derive(FromRow)]
struct ReflectionRecord {
    id: Uuid,
    user_id: Uuid,
    session_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}

impl ReflectionRecord {
    fn to_domain(self) -> Reflection {
        Reflection {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `ContentStore` Trait Implementation
//=========================================================================================

const SOURCE_COLUMNS: &str = "id, title, title_he, text_excerpt, text_excerpt_he, \
     reflection_prompt, reflection_prompt_he, category, subcategory, difficulty_level, \
     source_type, estimated_time, min_time, max_time, start_ref, end_ref, sefaria_link, \
     commentaries, learning_objectives, prerequisites, language_preference, published, \
     ai_generated";

#[async_trait]
impl ContentStore for PgStore {
    async fn fetch_published_sources(&self) -> PortResult<Vec<Source>> {
        let query = format!(
            "SELECT {} FROM sources WHERE published = TRUE ORDER BY created_at ASC",
            SOURCE_COLUMNS
        );
        let records = sqlx::query_as::<_, SourceRecord>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn fetch_user_history(
        &self,
        user_id: Uuid,
    ) -> PortResult<(Vec<StudySession>, Vec<Reflection>)> {
        let sessions = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, source_id, topic, time_selected, completed, started_at \
             FROM study_sessions WHERE user_id = $1 ORDER BY started_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let reflections = sqlx::query_as::<_, ReflectionRecord>(
            "SELECT id, user_id, session_id, text, created_at \
             FROM reflections WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok((
            sessions.into_iter().map(|r| r.to_domain()).collect(),
            reflections.into_iter().map(|r| r.to_domain()).collect(),
        ))
    }

    async fn record_session(&self, session: StudySession) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO study_sessions (id, user_id, source_id, topic, time_selected, completed, started_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.source_id)
        .bind(&session.topic)
        .bind(session.time_selected as i32)
        .bind(session.completed)
        .bind(session.started_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn save_reflection(&self, reflection: Reflection) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO reflections (id, user_id, session_id, text, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(reflection.id)
        .bind(reflection.user_id)
        .bind(reflection.session_id)
        .bind(&reflection.text)
        .bind(reflection.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn save_generated_source(&self, source: &Source) -> PortResult<()> {
        // Saved unpublished; a human review pass flips the flag before the
        // source can ever be recommended from the catalog.
        sqlx::query(
            "INSERT INTO sources (id, title, title_he, text_excerpt, text_excerpt_he, \
             reflection_prompt, reflection_prompt_he, category, subcategory, difficulty_level, \
             source_type, estimated_time, min_time, max_time, start_ref, end_ref, sefaria_link, \
             commentaries, learning_objectives, prerequisites, language_preference, published, \
             ai_generated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
             $18, $19, $20, $21, FALSE, TRUE)",
        )
        .bind(source.id)
        .bind(&source.title)
        .bind(&source.title_he)
        .bind(&source.text_excerpt)
        .bind(&source.text_excerpt_he)
        .bind(&source.reflection_prompt)
        .bind(&source.reflection_prompt_he)
        .bind(&source.category)
        .bind(&source.subcategory)
        .bind(source.difficulty_level.map(|d| d.as_str()))
        .bind(source.source_type.as_str())
        .bind(source.estimated_time as i32)
        .bind(source.min_time.map(|t| t as i32))
        .bind(source.max_time.map(|t| t as i32))
        .bind(&source.start_ref)
        .bind(&source.end_ref)
        .bind(&source.sefaria_link)
        .bind(&source.commentaries)
        .bind(&source.learning_objectives)
        .bind(&source.prerequisites)
        .bind(match source.language_preference {
            LanguagePreference::En => "en",
            LanguagePreference::He => "he",
            LanguagePreference::Both => "both",
        })
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
