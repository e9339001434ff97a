use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::kids::fetch_owned_kid;
use crate::models::enums::{Gender, RecordType};
use crate::models::kid::Kid;
use crate::models::record::JoinedRecord;
use crate::records::store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct KidCreate {
    pub user_id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

#[derive(Debug, Deserialize)]
pub struct KidUpdate {
    pub user_id: i64,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Trims a submitted kid name and rejects names that are empty after
/// trimming. Shared by create and update so a PUT cannot blank out a
/// name that a POST would have refused.
fn normalize_kid_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("kid name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// GET /api/v1/kids
pub async fn list_kids(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Kid>>, AppError> {
    let kids: Vec<Kid> = sqlx::query_as(
        "SELECT id, user_id, name, birth_date, gender FROM kids WHERE user_id = $1 ORDER BY id",
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(kids))
}

/// POST /api/v1/kids
pub async fn create_kid(
    State(state): State<AppState>,
    Json(req): Json<KidCreate>,
) -> Result<(StatusCode, Json<Kid>), AppError> {
    let name = normalize_kid_name(&req.name)?;

    let kid: Kid = sqlx::query_as(
        r#"
        INSERT INTO kids (user_id, name, birth_date, gender)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, name, birth_date, gender
        "#,
    )
    .bind(req.user_id)
    .bind(name)
    .bind(req.birth_date)
    .bind(req.gender)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(kid)))
}

/// GET /api/v1/kids/:kid_id
pub async fn get_kid(
    State(state): State<AppState>,
    Path(kid_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Kid>, AppError> {
    let kid = fetch_owned_kid(&state.db, kid_id, params.user_id).await?;
    Ok(Json(kid))
}

/// PUT /api/v1/kids/:kid_id
pub async fn update_kid(
    State(state): State<AppState>,
    Path(kid_id): Path<i64>,
    Json(req): Json<KidUpdate>,
) -> Result<Json<Kid>, AppError> {
    fetch_owned_kid(&state.db, kid_id, req.user_id).await?;

    let name = req.name.as_deref().map(normalize_kid_name).transpose()?;

    let kid: Kid = sqlx::query_as(
        r#"
        UPDATE kids
        SET name = COALESCE($3, name),
            birth_date = COALESCE($4, birth_date),
            gender = COALESCE($5, gender)
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, birth_date, gender
        "#,
    )
    .bind(kid_id)
    .bind(req.user_id)
    .bind(name)
    .bind(req.birth_date)
    .bind(req.gender)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(kid))
}

/// DELETE /api/v1/kids/:kid_id — cascades to records and chat sessions.
pub async fn delete_kid(
    State(state): State<AppState>,
    Path(kid_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    fetch_owned_kid(&state.db, kid_id, params.user_id).await?;

    sqlx::query("DELETE FROM kids WHERE id = $1 AND user_id = $2")
        .bind(kid_id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// The kid plus the most recent record of each summarized discriminant.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub kid: Kid,
    pub recent_records: RecentRecords,
}

#[derive(Debug, Serialize)]
pub struct RecentRecords {
    pub meal: Option<JoinedRecord>,
    pub sleep: Option<JoinedRecord>,
    pub health: Option<JoinedRecord>,
    pub growth: Option<JoinedRecord>,
}

/// GET /api/v1/kids/:kid_id/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(kid_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let kid = fetch_owned_kid(&state.db, kid_id, params.user_id).await?;

    let recent_records = RecentRecords {
        meal: store::most_recent(&state.db, kid_id, RecordType::Meal).await?,
        sleep: store::most_recent(&state.db, kid_id, RecordType::Sleep).await?,
        health: store::most_recent(&state.db, kid_id, RecordType::Health).await?,
        growth: store::most_recent(&state.db, kid_id, RecordType::Growth).await?,
    };

    Ok(Json(DashboardResponse {
        kid,
        recent_records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kid_name_is_trimmed() {
        assert_eq!(normalize_kid_name("  Alice  ").unwrap(), "Alice");
    }

    #[test]
    fn test_empty_kid_name_is_rejected() {
        assert!(normalize_kid_name("").is_err());
        assert!(normalize_kid_name("   ").is_err());
    }

    #[test]
    fn test_update_cannot_blank_a_name() {
        // The update payload carries Option<String>; None leaves the
        // stored name alone, Some goes through the same check as create.
        let blank = Some("   ".to_string());
        assert!(blank.as_deref().map(normalize_kid_name).transpose().is_err());

        let none: Option<String> = None;
        assert_eq!(
            none.as_deref().map(normalize_kid_name).transpose().unwrap(),
            None
        );
    }
}
