use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only message row. Immutable after insert except for the one-way
/// is_read transition (0 -> 1), which is scoped to the recipient.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
    pub is_read: i64,
}

impl Message {
    pub fn new(conversation_id: String, sender_id: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            sender_id,
            content,
            created_at: Utc::now().to_rfc3339(),
            is_read: 0,
        }
    }
}
