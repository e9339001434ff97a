use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::chat::personas::Persona;
use crate::models::enums::Sender;

/// One conversation thread tied to a single kid.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: i64,
    pub kid_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored chat turn. `persona` is only set on assistant rows and names
/// the template the reply was generated under.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: i64,
    pub sender: Sender,
    pub persona: Option<Persona>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
