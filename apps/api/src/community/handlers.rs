use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::community::{Comment, Post, PostSummary};
use crate::records::store::effective_limit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PostCreate {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentCreate {
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub like_count: i64,
    pub comments: Vec<Comment>,
}

/// GET /api/v1/community/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    let limit = effective_limit(params.limit).map_err(AppError::Validation)?;

    let posts: Vec<PostSummary> = sqlx::query_as(
        r#"
        SELECT p.id, p.user_id, p.title, p.content, p.created_at,
               (SELECT COUNT(*) FROM community_likes l WHERE l.post_id = p.id) AS like_count,
               (SELECT COUNT(*) FROM community_comments c WHERE c.post_id = p.id) AS comment_count
        FROM community_posts p
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(posts))
}

/// POST /api/v1/community/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<PostCreate>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(AppError::Validation(
            "post title and content must not be empty".into(),
        ));
    }

    let post: Post = sqlx::query_as(
        r#"
        INSERT INTO community_posts (user_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, content, created_at
        "#,
    )
    .bind(req.user_id)
    .bind(req.title.trim())
    .bind(req.content.trim())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/v1/community/posts/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetail>, AppError> {
    let post: Option<Post> = sqlx::query_as(
        "SELECT id, user_id, title, content, created_at FROM community_posts WHERE id = $1",
    )
    .bind(post_id)
    .fetch_optional(&state.db)
    .await?;

    let post = post.ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    let like_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM community_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&state.db)
            .await?;

    let comments: Vec<Comment> = sqlx::query_as(
        r#"
        SELECT id, post_id, user_id, content, created_at
        FROM community_comments
        WHERE post_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(post_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(PostDetail {
        post,
        like_count,
        comments,
    }))
}

/// DELETE /api/v1/community/posts/:post_id — owner only.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM community_posts WHERE id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/community/posts/:post_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(req): Json<CommentCreate>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("comment must not be empty".into()));
    }

    ensure_post_exists(&state, post_id).await?;

    let comment: Comment = sqlx::query_as(
        r#"
        INSERT INTO community_comments (post_id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, post_id, user_id, content, created_at
        "#,
    )
    .bind(post_id)
    .bind(req.user_id)
    .bind(req.content.trim())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/community/comments/:comment_id — owner only.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM community_comments WHERE id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Comment {comment_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/community/posts/:post_id/like — at most one like per
/// account per post, enforced by the unique constraint.
pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    ensure_post_exists(&state, post_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO community_likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(params.user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Validation("post already liked".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/community/posts/:post_id/like
pub async fn unlike_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM community_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("like not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_post_exists(state: &AppState, post_id: i64) -> Result<(), AppError> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM community_posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&state.db)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }
    Ok(())
}
