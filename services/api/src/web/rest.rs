//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use torah_study_core::domain::{
    Language, Recommendation, RecommendationRequest, RecommendationTier, Reflection, Source,
    StudySession,
};
use torah_study_core::personalization::{
    analyze_learning_pattern, consistency_score, growth_rate,
};
use torah_study_core::quality::assess_quality;
use torah_study_core::recommend::{RecommendationEngine, TimeBucket};
use torah_study_core::webhook::WebhookParser;
use torah_study_core::LearningPattern;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        recommend_handler,
        record_session_handler,
        save_reflection_handler,
        save_generated_source_handler,
        learning_pattern_handler,
    ),
    components(
        schemas(RecommendPayload, RecommendResponse, RecordSessionPayload,
            RecordSessionResponse, SaveReflectionPayload, LearningPatternResponse)
    ),
    tags(
        (name = "Study Companion API", description = "API endpoints for the source recommendation engine.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for one recommendation cycle. Skipping a source is
/// the same call again with the skipped id appended to `exclude`.
#[derive(Deserialize, ToSchema)]
pub struct RecommendPayload {
    pub time_selected: u32,
    pub topic_selected: String,
    #[schema(value_type = String, example = "en")]
    pub language: Language,
    #[serde(default)]
    pub exclude: Vec<Uuid>,
}

/// The recommendation result. `source` is null when every tier, including
/// external generation, is exhausted; the client then shows its own
/// broadening suggestions.
#[derive(Serialize, ToSchema)]
pub struct RecommendResponse {
    #[schema(value_type = Option<Object>)]
    pub source: Option<Source>,
    #[schema(value_type = Option<String>)]
    pub tier: Option<RecommendationTier>,
    pub warnings: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordSessionPayload {
    pub source_id: Option<Uuid>,
    pub topic: String,
    pub time_selected: u32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Serialize, ToSchema)]
pub struct RecordSessionResponse {
    pub session_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveReflectionPayload {
    pub session_id: Uuid,
    pub text: String,
}

/// The learning-pattern report: the recomputed projection plus its derived
/// growth and consistency metrics.
#[derive(Serialize, ToSchema)]
pub struct LearningPatternResponse {
    #[schema(value_type = Object)]
    pub pattern: LearningPattern,
    pub weekly_growth: f64,
    pub monthly_growth: f64,
    pub consistency: f64,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;
    Uuid::parse_str(raw)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid x-user-id format".to_string()))
}

/// Tier 4: the catalog is exhausted, so ask the external generation service
/// for a fresh source and parse its raw reply. Any failure here is logged
/// and treated as "tier unavailable" so the caller sees the designed null
/// result instead of an error.
async fn generation_fallback(
    app_state: &AppState,
    request: &RecommendationRequest,
) -> Option<Recommendation> {
    let raw = match app_state
        .generator
        .generate_source(
            request.time_selected,
            &request.topic_selected,
            request.language,
        )
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Generation tier unavailable: {}", e);
            return None;
        }
    };

    let parser = WebhookParser::new(
        request.language,
        request.time_selected,
        request.topic_selected.clone(),
    );
    let parsed = parser.parse(&raw);
    if !parsed.is_usable() {
        warn!("Generation reply was unusable; treating the tier as empty");
        return None;
    }

    let bucket = TimeBucket::for_minutes(request.time_selected);
    let source = parsed.into_source(
        &request.topic_selected,
        bucket.allowed_types[0],
        bucket.max_difficulty,
    )?;

    let mut warnings = Vec::new();
    let report = assess_quality(&source);
    if report.is_flagged() {
        warnings.extend(report.warnings);
    }
    Some(Recommendation {
        source,
        tier: RecommendationTier::Generated,
        warnings,
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Recommend a single study source.
///
/// Runs the tiered engine over the published catalog; when the catalog is
/// exhausted for this request, falls back to external generation. A null
/// `source` means full exhaustion, which is the designed terminal state.
#[utoipa::path(
    post,
    path = "/recommendations",
    request_body = RecommendPayload,
    responses(
        (status = 200, description = "Recommendation cycle completed", body = RecommendResponse),
        (status = 400, description = "Bad request (e.g., missing header)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn recommend_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RecommendPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from_headers(&headers)?;

    let catalog = app_state.store.fetch_published_sources().await.map_err(|e| {
        error!("Failed to fetch catalog: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch sources".to_string(),
        )
    })?;

    let pattern = match app_state.store.fetch_user_history(user_id).await {
        Ok((sessions, reflections)) => analyze_learning_pattern(&sessions, &reflections),
        Err(e) => {
            // History is a ranking aid, not a requirement; a new or
            // unreadable history just means default preferences.
            warn!("Failed to fetch history for {}: {:?}", user_id, e);
            LearningPattern::default()
        }
    };

    let request = RecommendationRequest {
        time_selected: payload.time_selected,
        topic_selected: payload.topic_selected,
        language: payload.language,
        exclude: payload.exclude.into_iter().collect::<HashSet<Uuid>>(),
    };

    let mut engine = RecommendationEngine::new();
    let mut recommendation = engine.recommend(&catalog, &request, &pattern);
    if recommendation.is_none() {
        recommendation = generation_fallback(&app_state, &request).await;
    }

    let response = match recommendation {
        Some(rec) => RecommendResponse {
            source: Some(rec.source),
            tier: Some(rec.tier),
            warnings: rec.warnings,
        },
        None => RecommendResponse {
            source: None,
            tier: None,
            warnings: Vec::new(),
        },
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Record a completed (or abandoned) study session into the user's history.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = RecordSessionPayload,
    responses(
        (status = 201, description = "Session recorded", body = RecordSessionResponse),
        (status = 400, description = "Bad request (e.g., missing header)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn record_session_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RecordSessionPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from_headers(&headers)?;

    let session = StudySession {
        id: Uuid::new_v4(),
        user_id,
        source_id: payload.source_id,
        topic: payload.topic,
        time_selected: payload.time_selected,
        completed: payload.completed,
        started_at: Utc::now(),
    };
    let session_id = session.id;

    app_state.store.record_session(session).await.map_err(|e| {
        error!("Failed to record session: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to record session".to_string(),
        )
    })?;

    Ok((StatusCode::CREATED, Json(RecordSessionResponse { session_id })))
}

/// Save a reflection written after a session.
#[utoipa::path(
    post,
    path = "/reflections",
    request_body = SaveReflectionPayload,
    responses(
        (status = 201, description = "Reflection saved"),
        (status = 400, description = "Bad request (e.g., missing header)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn save_reflection_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SaveReflectionPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from_headers(&headers)?;

    let reflection = Reflection {
        id: Uuid::new_v4(),
        user_id,
        session_id: payload.session_id,
        text: payload.text,
        created_at: Utc::now(),
    };

    app_state.store.save_reflection(reflection).await.map_err(|e| {
        error!("Failed to save reflection: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save reflection".to_string(),
        )
    })?;

    Ok(StatusCode::CREATED)
}

/// Explicitly persist an AI-generated source.
///
/// Generated sources are never written by the recommendation flow itself;
/// this is the opt-in path, and the row is stored unpublished.
#[utoipa::path(
    post,
    path = "/sources/save",
    request_body(content_type = "application/json", description = "The generated source record, exactly as returned by a recommendation."),
    responses(
        (status = 201, description = "Source saved for review"),
        (status = 400, description = "The payload is not a generated source"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_generated_source_handler(
    State(app_state): State<Arc<AppState>>,
    Json(source): Json<Source>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !source.ai_generated {
        return Err((
            StatusCode::BAD_REQUEST,
            "Only AI-generated sources can be saved through this endpoint".to_string(),
        ));
    }

    app_state
        .store
        .save_generated_source(&source)
        .await
        .map_err(|e| {
            error!("Failed to save generated source: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save source".to_string(),
            )
        })?;

    Ok(StatusCode::CREATED)
}

/// Report the user's learning pattern and derived metrics.
#[utoipa::path(
    get,
    path = "/users/{user_id}/pattern",
    responses(
        (status = 200, description = "Learning pattern computed", body = LearningPatternResponse),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("user_id" = Uuid, Path, description = "The unique ID of the user.")
    )
)]
pub async fn learning_pattern_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (sessions, reflections) =
        app_state.store.fetch_user_history(user_id).await.map_err(|e| {
            error!("Failed to fetch history for {}: {:?}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch history".to_string(),
            )
        })?;

    let now = Utc::now();
    let response = LearningPatternResponse {
        pattern: analyze_learning_pattern(&sessions, &reflections),
        weekly_growth: growth_rate(&sessions, now, 7),
        monthly_growth: growth_rate(&sessions, now, 30),
        consistency: consistency_score(&sessions, now),
    };
    Ok((StatusCode::OK, Json(response)))
}
