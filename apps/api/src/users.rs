//! Minimal guardian-account endpoints. Credentials and sessions are an
//! external concern; this module only owns the account rows the rest of
//! the schema hangs off.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub nickname: Option<String>,
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let username = req.username.trim();
    if username.is_empty() || username.len() > 50 {
        return Err(AppError::Validation(
            "username must be 1-50 characters".into(),
        ));
    }

    let user: Option<User> = sqlx::query_as(
        r#"
        INSERT INTO users (username, nickname)
        VALUES ($1, $2)
        ON CONFLICT (username) DO NOTHING
        RETURNING id, username, nickname, created_at
        "#,
    )
    .bind(username)
    .bind(&req.nickname)
    .fetch_optional(&state.db)
    .await?;

    match user {
        Some(user) => Ok((StatusCode::CREATED, Json(user))),
        None => Err(AppError::Validation(format!(
            "username '{username}' is already taken"
        ))),
    }
}

/// GET /api/v1/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user: Option<User> =
        sqlx::query_as("SELECT id, username, nickname, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;

    user.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}
