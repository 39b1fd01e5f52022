use crate::error::ApiError;
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use supportdesk_core::{HistoryItem, Turn};
use supportdesk_session::Session;
use tracing::{debug, info};
use uuid::Uuid;

/// First bot message of a new session.
pub const GREETING: &str = "Hello! I'm your support assistant. How can I help you today?";

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Prior turns supplied by the caller, used as context when the session
    /// has no history of its own yet.
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub session_id: Uuid,
    pub escalated: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub query_history: Vec<String>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            created_at: session.created_at,
            query_history: session.query_history,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub greeting: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextActionsResponse {
    pub next_actions: Vec<String>,
}

pub async fn health_handler() -> String {
    serde_json::json!({"status": "ok", "service": "supportdesk"}).to_string()
}

/// `POST /api/session/create`
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreatedSession>, ApiError> {
    let session = state.sessions.create_session().await?;
    Ok(Json(CreatedSession {
        session_id: session.session_id,
        created_at: session.created_at,
        greeting: GREETING.to_string(),
    }))
}

/// `POST /api/query`
///
/// An absent, malformed, unknown or expired `session_id` starts a new
/// session. Suggestions are only generated for replies that were not
/// escalated.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }
    if query.chars().count() > state.max_query_length {
        return Err(ApiError::PayloadTooLarge {
            max: state.max_query_length,
        });
    }

    let session = resolve_session(&state, req.session_id.as_deref()).await?;
    let session_id = session.session_id;

    let history: Vec<Turn> = if session.query_history.is_empty() {
        req.history.into_iter().map(Turn::from).collect()
    } else {
        Turn::from_history(&session.query_history)
    };

    let reply = state.agent.generate_response(query, &history).await;
    state
        .sessions
        .add_to_conversation(session_id, query, &reply.text)
        .await?;

    let suggestions = if reply.escalated {
        Vec::new()
    } else {
        state.agent.suggest_next_actions(&reply.text).await
    };

    info!(
        session_id = %session_id,
        escalated = reply.escalated,
        suggestions = suggestions.len(),
        "Query answered"
    );

    Ok(Json(QueryResponse {
        response: reply.text,
        session_id,
        escalated: reply.escalated,
        suggestions,
    }))
}

async fn resolve_session(state: &AppState, raw_id: Option<&str>) -> Result<Session, ApiError> {
    if let Some(id) = raw_id.and_then(|raw| Uuid::parse_str(raw).ok()) {
        if let Some(session) = state.sessions.get_session(id).await? {
            return Ok(session);
        }
        debug!(session_id = %id, "Unknown or expired session, starting a new one");
    }
    Ok(state.sessions.create_session().await?)
}

/// `GET /api/session/{id}`
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &raw_id).await?;
    Ok(Json(session.into()))
}

/// `DELETE /api/session/{id}`
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // A malformed id cannot name a stored session.
    if let Ok(id) = Uuid::parse_str(&raw_id) {
        state.sessions.delete_session(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sessions`
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let sessions = state.sessions.list_sessions().await?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect()))
}

/// `POST /api/summarize/{id}`
///
/// The summary is also appended to the session's contextual memory.
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let session = find_session(&state, &raw_id).await?;
    let transcript = render_transcript(&Turn::from_history(&session.query_history));

    let summary = state.agent.summarize_session(&transcript).await;
    state
        .sessions
        .store_session_summary(session.session_id, &summary)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

/// `POST /api/next-actions/{id}`
pub async fn next_actions(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<NextActionsResponse>, ApiError> {
    let session = find_session(&state, &raw_id).await?;
    let next_actions = match session.last_response() {
        Some(latest) => state.agent.suggest_next_actions(latest).await,
        None => Vec::new(),
    };
    Ok(Json(NextActionsResponse { next_actions }))
}

async fn find_session(state: &AppState, raw_id: &str) -> Result<Session, ApiError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| ApiError::NotFound(raw_id.to_string()))?;
    state
        .sessions
        .get_session(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(raw_id.to_string()))
}

/// `Role: content` lines, one per turn.
fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.label(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}
