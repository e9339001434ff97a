pub mod handlers;

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::kid::Kid;

/// Resolves a kid under the calling account. A kid that exists but
/// belongs to someone else is indistinguishable from one that does not
/// exist: both are NotFound.
pub async fn fetch_owned_kid(pool: &PgPool, kid_id: i64, user_id: i64) -> Result<Kid, AppError> {
    let kid: Option<Kid> = sqlx::query_as(
        "SELECT id, user_id, name, birth_date, gender FROM kids WHERE id = $1 AND user_id = $2",
    )
    .bind(kid_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    kid.ok_or_else(|| AppError::NotFound("Kid not found".to_string()))
}
