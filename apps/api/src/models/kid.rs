use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::enums::Gender;

/// A child profile owned by exactly one guardian account. Deleting a kid
/// cascades to its records and chat sessions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Kid {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}
