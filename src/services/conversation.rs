use crate::database::DbPool;
use crate::models::conversation::{Conversation, ConversationSummary};
use crate::models::message::Message;
use crate::models::profile::ProfileResponse;
use crate::services::message::unread_count;
use crate::services::profile::{find_profile, profile_exists};
use crate::utils::error::{AppError, AppResult};

/// Resolves the canonical conversation for the caller and another user,
/// creating it on first contact. Idempotent under concurrent first contact
/// from both sides: the unique index on the normalized pair decides the
/// winner and the loser re-fetches.
pub async fn get_or_create_conversation(
    pool: &DbPool,
    caller_id: &str,
    other_user_id: &str,
) -> AppResult<Conversation> {
    if caller_id == other_user_id {
        return Err(AppError::Validation(
            "Cannot start a conversation with yourself".to_string(),
        ));
    }

    if !profile_exists(pool, other_user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let (mut user_a, mut user_b) = (caller_id.to_string(), other_user_id.to_string());
    if user_a > user_b {
        std::mem::swap(&mut user_a, &mut user_b);
    }

    if let Some(existing) = find_by_pair(pool, &user_a, &user_b).await? {
        return Ok(existing);
    }

    let conversation = Conversation::new(user_a.clone(), user_b.clone());

    let inserted = sqlx::query(
        "INSERT INTO conversations (id, user_a, user_b, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&conversation.id)
    .bind(&conversation.user_a)
    .bind(&conversation.user_b)
    .bind(&conversation.created_at)
    .bind(&conversation.updated_at)
    .execute(pool.as_ref())
    .await;

    match inserted {
        Ok(_) => Ok(conversation),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            // The other participant created the row between our select and
            // insert. Their row wins; return it instead of surfacing an error.
            find_by_pair(pool, &user_a, &user_b).await?.ok_or_else(|| {
                AppError::Internal("Conversation missing after unique conflict".to_string())
            })
        }
        Err(e) => Err(e.into()),
    }
}

async fn find_by_pair(
    pool: &DbPool,
    user_a: &str,
    user_b: &str,
) -> AppResult<Option<Conversation>> {
    let conversation = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE user_a = ? AND user_b = ?",
    )
    .bind(user_a)
    .bind(user_b)
    .fetch_optional(pool.as_ref())
    .await?;

    Ok(conversation)
}

/// All of the caller's conversations, most recently active first, each
/// enriched with the counterparty profile, latest message and unread count.
pub async fn list_conversations(
    pool: &DbPool,
    caller_id: &str,
) -> AppResult<Vec<ConversationSummary>> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE user_a = ? OR user_b = ? ORDER BY updated_at DESC, id ASC",
    )
    .bind(caller_id)
    .bind(caller_id)
    .fetch_all(pool.as_ref())
    .await?;

    let mut summaries = Vec::with_capacity(conversations.len());

    for conversation in conversations {
        let other_id = conversation.other_participant(caller_id).to_string();

        // A deleted account must not hide the thread; fall back to a placeholder.
        let other_participant = find_profile(pool, &other_id)
            .await?
            .map(ProfileResponse::from)
            .unwrap_or_else(|| ProfileResponse::placeholder(&other_id));

        let last_message = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(&conversation.id)
        .fetch_optional(pool.as_ref())
        .await?;

        let unread_count = unread_count(pool, &conversation.id, caller_id).await?;

        summaries.push(ConversationSummary {
            conversation,
            other_participant,
            last_message,
            unread_count,
        });
    }

    Ok(summaries)
}
