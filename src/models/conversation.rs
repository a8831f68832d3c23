use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::message::Message;
use crate::models::profile::ProfileResponse;

/// Canonical two-party conversation. The participant pair is unordered:
/// `user_a` and `user_b` are stored in lexicographic order so the unique
/// index on (user_a, user_b) deduplicates both initiation directions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: String,
    pub user_a: String,
    pub user_b: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn new(mut user_a: String, mut user_b: String) -> Self {
        if user_a > user_b {
            std::mem::swap(&mut user_a, &mut user_b);
        }

        let now = Utc::now().to_rfc3339();

        Self {
            id: Uuid::new_v4().to_string(),
            user_a,
            user_b,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    /// The participant that is not `user_id`. Callers check participation first.
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.user_a == user_id {
            &self.user_b
        } else {
            &self.user_a
        }
    }
}

/// What the conversation list returns per row: the conversation itself plus
/// the counterparty profile, the latest message and the viewer's unread count.
/// Assembled at read time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub other_participant: ProfileResponse,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}
