use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::chat::context::build_kid_context;
use crate::chat::orchestrator::{self, HistoryEntry};
use crate::chat::personas::Persona;
use crate::errors::AppError;
use crate::kids::fetch_owned_kid;
use crate::models::chat::{ChatMessage, ChatSession};
use crate::models::enums::Sender;
use crate::models::kid::Kid;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionCreate {
    pub user_id: i64,
    pub kid_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub user_id: i64,
    pub kid_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    pub user_id: i64,
    pub content: String,
    /// Persona selector; anything unrecognized (or absent) means the
    /// default `mom` persona.
    pub persona: Option<String>,
}

/// One completed chat turn: the stored user message and the stored
/// assistant reply.
#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

/// POST /api/v1/chat/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<SessionCreate>,
) -> Result<(StatusCode, Json<ChatSession>), AppError> {
    fetch_owned_kid(&state.db, req.kid_id, req.user_id).await?;

    let session: ChatSession = sqlx::query_as(
        r#"
        INSERT INTO chat_sessions (kid_id)
        VALUES ($1)
        RETURNING id, kid_id, created_at, updated_at
        "#,
    )
    .bind(req.kid_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/chat/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionListQuery>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    fetch_owned_kid(&state.db, params.kid_id, params.user_id).await?;

    let sessions: Vec<ChatSession> = sqlx::query_as(
        r#"
        SELECT id, kid_id, created_at, updated_at
        FROM chat_sessions
        WHERE kid_id = $1
        ORDER BY updated_at DESC
        "#,
    )
    .bind(params.kid_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(sessions))
}

/// GET /api/v1/chat/sessions/:session_id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    fetch_owned_session(&state.db, session_id, params.user_id).await?;

    let messages = session_messages(&state.db, session_id).await?;
    Ok(Json(messages))
}

/// POST /api/v1/chat/sessions/:session_id/messages
///
/// Persists the user message, runs one orchestrator turn grounded in the
/// session's kid, persists the reply. Always 200 once the messages are
/// stored — a model failure surfaces as the reply text, not as an error.
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Json(req): Json<MessageCreate>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("message content must not be empty".into()));
    }

    let (_, kid) = fetch_owned_session(&state.db, session_id, req.user_id).await?;
    let persona = Persona::parse_or_default(req.persona.as_deref());

    let user_message = insert_message(
        &state.db,
        session_id,
        Sender::User,
        None,
        req.content.trim(),
    )
    .await?;

    // Everything stored before this turn's user message.
    let history: Vec<HistoryEntry> = session_messages(&state.db, session_id)
        .await?
        .into_iter()
        .filter(|m| m.id < user_message.id)
        .map(|m| HistoryEntry {
            sender: m.sender,
            content: m.content,
        })
        .collect();

    // Grounding is only worth assembling when a model will see it.
    let kid_context = match &state.llm {
        Some(_) => Some(build_kid_context(&state.db, &kid).await?),
        None => None,
    };

    let reply = orchestrator::respond(
        state.llm.as_ref(),
        req.content.trim(),
        persona,
        &history,
        kid_context.as_deref(),
    )
    .await;

    let assistant_message =
        insert_message(&state.db, session_id, Sender::Assistant, Some(persona), &reply).await?;

    sqlx::query("UPDATE chat_sessions SET updated_at = now() WHERE id = $1")
        .bind(session_id)
        .execute(&state.db)
        .await?;

    Ok(Json(ChatTurnResponse {
        user_message,
        assistant_message,
    }))
}

/// Resolves a session through its kid's owner; a session under someone
/// else's kid is NotFound.
async fn fetch_owned_session(
    pool: &PgPool,
    session_id: i64,
    user_id: i64,
) -> Result<(ChatSession, Kid), AppError> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT s.kid_id
        FROM chat_sessions s
        JOIN kids k ON k.id = s.kid_id
        WHERE s.id = $1 AND k.user_id = $2
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some((kid_id,)) = row else {
        return Err(AppError::NotFound("Chat session not found".to_string()));
    };

    let kid = fetch_owned_kid(pool, kid_id, user_id).await?;

    let session: ChatSession = sqlx::query_as(
        "SELECT id, kid_id, created_at, updated_at FROM chat_sessions WHERE id = $1",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await?;

    Ok((session, kid))
}

async fn session_messages(pool: &PgPool, session_id: i64) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, session_id, sender, persona, content, created_at
        FROM chat_messages
        WHERE session_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

async fn insert_message(
    pool: &PgPool,
    session_id: i64,
    sender: Sender,
    persona: Option<Persona>,
    content: &str,
) -> Result<ChatMessage, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO chat_messages (session_id, sender, persona, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, session_id, sender, persona, content, created_at
        "#,
    )
    .bind(session_id)
    .bind(sender)
    .bind(persona)
    .bind(content)
    .fetch_one(pool)
    .await
}
