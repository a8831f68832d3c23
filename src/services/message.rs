use crate::database::DbPool;
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::validate_message_content;
use sqlx::Row;

/// Loads the conversation and checks the caller is one of its two
/// participants. Every message operation goes through this gate.
async fn require_participant(
    pool: &DbPool,
    conversation_id: &str,
    caller_id: &str,
) -> AppResult<Conversation> {
    let conversation =
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .fetch_optional(pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    if !conversation.is_participant(caller_id) {
        return Err(AppError::Forbidden(
            "You are not part of this conversation".to_string(),
        ));
    }

    Ok(conversation)
}

/// Appends a message and advances the conversation's updated_at to the
/// message timestamp. That bump is what re-ranks the thread to the top of
/// the conversation list, and nothing else writes updated_at.
pub async fn send_message(
    pool: &DbPool,
    caller_id: &str,
    conversation_id: &str,
    content: &str,
) -> AppResult<Message> {
    let trimmed = validate_message_content(content)?;

    let conversation = require_participant(pool, conversation_id, caller_id).await?;

    let message = Message::new(
        conversation.id.clone(),
        caller_id.to_string(),
        trimmed.to_string(),
    );

    sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, content, created_at, is_read)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.sender_id)
    .bind(&message.content)
    .bind(&message.created_at)
    .bind(message.is_read)
    .execute(pool.as_ref())
    .await?;

    sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
        .bind(&message.created_at)
        .bind(&conversation.id)
        .execute(pool.as_ref())
        .await?;

    Ok(message)
}

/// Full message history in chronological order. Read state is metadata for
/// the client's badges, never a visibility filter.
pub async fn list_messages(
    pool: &DbPool,
    caller_id: &str,
    conversation_id: &str,
) -> AppResult<Vec<Message>> {
    require_participant(pool, conversation_id, caller_id).await?;

    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

/// Marks everything the other participant sent as read. Idempotent: with
/// nothing unread this updates zero rows and succeeds. Returns the number
/// of messages transitioned so the client can adjust its badge total.
pub async fn mark_conversation_read(
    pool: &DbPool,
    caller_id: &str,
    conversation_id: &str,
) -> AppResult<u64> {
    require_participant(pool, conversation_id, caller_id).await?;

    let result = sqlx::query(
        "UPDATE messages SET is_read = 1 WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
    )
    .bind(conversation_id)
    .bind(caller_id)
    .execute(pool.as_ref())
    .await?;

    Ok(result.rows_affected())
}

/// Messages in the conversation sent by the other participant that the
/// viewer has not yet seen. Recomputed per query, never stored.
pub async fn unread_count(
    pool: &DbPool,
    conversation_id: &str,
    viewer_id: &str,
) -> AppResult<i64> {
    let count = sqlx::query(
        "SELECT COUNT(*) as count FROM messages WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
    )
    .bind(conversation_id)
    .bind(viewer_id)
    .fetch_one(pool.as_ref())
    .await?
    .get::<i64, _>("count");

    Ok(count)
}
