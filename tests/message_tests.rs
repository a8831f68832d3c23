//! Message exchange protocol tests
//!
//! Covers message ordering, unread accounting, the one-way read transition
//! and participant-only authorization, ending with the full two-user
//! exchange scenario.

use atelier::database::DbPool;
use atelier::services::conversation::{get_or_create_conversation, list_conversations};
use atelier::services::message::{
    list_messages, mark_conversation_read, send_message, unread_count,
};
use atelier::utils::error::AppError;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Fresh in-memory database with migrations applied. Named shared-cache URIs
/// keep every pooled connection pointed at the same database.
async fn setup_test_db() -> DbPool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_url = format!("sqlite:file:msg_testdb{}?mode=memory&cache=shared", db_num);
    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    Arc::new(pool)
}

async fn insert_profile(pool: &DbPool, id: &str, display_name: &str) {
    sqlx::query(
        "INSERT INTO profiles (id, display_name, avatar_ref, membership_tier, created_at)
         VALUES (?, ?, NULL, 'free', ?)",
    )
    .bind(id)
    .bind(display_name)
    .bind(Utc::now().to_rfc3339())
    .execute(pool.as_ref())
    .await
    .unwrap();
}

async fn setup_pair(pool: &DbPool) -> String {
    insert_profile(pool, "alice", "Alice").await;
    insert_profile(pool, "bob", "Bob").await;
    get_or_create_conversation(pool, "alice", "bob")
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn messages_come_back_in_chronological_order() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    // Interleaved senders; retrieval order must follow creation time.
    send_message(&pool, "alice", &conversation_id, "one")
        .await
        .unwrap();
    send_message(&pool, "bob", &conversation_id, "two")
        .await
        .unwrap();
    send_message(&pool, "alice", &conversation_id, "three")
        .await
        .unwrap();
    send_message(&pool, "bob", &conversation_id, "four")
        .await
        .unwrap();

    let messages = list_messages(&pool, "alice", &conversation_id)
        .await
        .unwrap();

    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three", "four"]);

    for pair in messages.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn send_increments_recipient_unread_only() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    assert_eq!(unread_count(&pool, &conversation_id, "bob").await.unwrap(), 0);

    send_message(&pool, "alice", &conversation_id, "hi")
        .await
        .unwrap();

    assert_eq!(unread_count(&pool, &conversation_id, "bob").await.unwrap(), 1);
    assert_eq!(
        unread_count(&pool, &conversation_id, "alice").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn send_advances_conversation_updated_at() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    let before: (String,) = sqlx::query_as("SELECT updated_at FROM conversations WHERE id = ?")
        .bind(&conversation_id)
        .fetch_one(pool.as_ref())
        .await
        .unwrap();

    let message = send_message(&pool, "alice", &conversation_id, "bump")
        .await
        .unwrap();

    let after: (String,) = sqlx::query_as("SELECT updated_at FROM conversations WHERE id = ?")
        .bind(&conversation_id)
        .fetch_one(pool.as_ref())
        .await
        .unwrap();

    assert!(after.0 >= before.0);
    assert_eq!(after.0, message.created_at);
}

#[tokio::test]
async fn mark_read_is_idempotent() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    send_message(&pool, "alice", &conversation_id, "one")
        .await
        .unwrap();
    send_message(&pool, "alice", &conversation_id, "two")
        .await
        .unwrap();

    let marked = mark_conversation_read(&pool, "bob", &conversation_id)
        .await
        .unwrap();
    assert_eq!(marked, 2);
    assert_eq!(unread_count(&pool, &conversation_id, "bob").await.unwrap(), 0);

    // Second call is a no-op, not an error.
    let marked = mark_conversation_read(&pool, "bob", &conversation_id)
        .await
        .unwrap();
    assert_eq!(marked, 0);
    assert_eq!(unread_count(&pool, &conversation_id, "bob").await.unwrap(), 0);
}

#[tokio::test]
async fn mark_read_never_touches_own_messages() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    send_message(&pool, "alice", &conversation_id, "from alice")
        .await
        .unwrap();
    send_message(&pool, "bob", &conversation_id, "from bob")
        .await
        .unwrap();

    // Alice reading the thread consumes bob's message, not her own state
    // as seen by bob.
    mark_conversation_read(&pool, "alice", &conversation_id)
        .await
        .unwrap();

    assert_eq!(
        unread_count(&pool, &conversation_id, "alice").await.unwrap(),
        0
    );
    assert_eq!(unread_count(&pool, &conversation_id, "bob").await.unwrap(), 1);
}

#[tokio::test]
async fn non_participant_is_forbidden() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;
    insert_profile(&pool, "carol", "Carol").await;

    let read = list_messages(&pool, "carol", &conversation_id).await;
    assert!(matches!(read, Err(AppError::Forbidden(_))));

    let write = send_message(&pool, "carol", &conversation_id, "let me in").await;
    assert!(matches!(write, Err(AppError::Forbidden(_))));

    let mark = mark_conversation_read(&pool, "carol", &conversation_id).await;
    assert!(matches!(mark, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn missing_conversation_is_not_found() {
    let pool = setup_test_db().await;
    insert_profile(&pool, "alice", "Alice").await;

    let result = send_message(&pool, "alice", "no-such-conversation", "hello").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn content_bounds_are_enforced() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    let empty = send_message(&pool, "alice", &conversation_id, "").await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let whitespace = send_message(&pool, "alice", &conversation_id, "   \n\t ").await;
    assert!(matches!(whitespace, Err(AppError::Validation(_))));

    let at_limit = "x".repeat(1000);
    send_message(&pool, "alice", &conversation_id, &at_limit)
        .await
        .unwrap();

    let over_limit = "x".repeat(1001);
    let too_long = send_message(&pool, "alice", &conversation_id, &over_limit).await;
    assert!(matches!(too_long, Err(AppError::Validation(_))));

    // Surrounding whitespace is trimmed before the bound applies.
    let padded = format!("  {}  ", at_limit);
    let stored = send_message(&pool, "alice", &conversation_id, &padded)
        .await
        .unwrap();
    assert_eq!(stored.content, at_limit);
}

#[tokio::test]
async fn read_state_is_metadata_not_a_filter() {
    let pool = setup_test_db().await;
    let conversation_id = setup_pair(&pool).await;

    send_message(&pool, "alice", &conversation_id, "old")
        .await
        .unwrap();
    mark_conversation_read(&pool, "bob", &conversation_id)
        .await
        .unwrap();
    send_message(&pool, "alice", &conversation_id, "new")
        .await
        .unwrap();

    let messages = list_messages(&pool, "bob", &conversation_id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].is_read, 1);
    assert_eq!(messages[1].is_read, 0);
}

#[tokio::test]
async fn full_two_user_exchange() {
    let pool = setup_test_db().await;
    insert_profile(&pool, "alice", "Alice").await;
    insert_profile(&pool, "bob", "Bob").await;

    // A opens the thread and greets B.
    let conversation = get_or_create_conversation(&pool, "alice", "bob")
        .await
        .unwrap();
    let m1 = send_message(&pool, "alice", &conversation.id, "Hello")
        .await
        .unwrap();
    assert_eq!(unread_count(&pool, &conversation.id, "bob").await.unwrap(), 1);

    // B's conversation list shows the thread with the greeting unread.
    let summaries = list_conversations(&pool, "bob").await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].unread_count, 1);
    assert_eq!(
        summaries[0].last_message.as_ref().map(|m| m.id.as_str()),
        Some(m1.id.as_str())
    );

    // B opens the thread, which consumes the unread state.
    mark_conversation_read(&pool, "bob", &conversation.id)
        .await
        .unwrap();
    assert_eq!(unread_count(&pool, &conversation.id, "bob").await.unwrap(), 0);

    // B replies; now A has the unread badge.
    send_message(&pool, "bob", &conversation.id, "Hi back")
        .await
        .unwrap();
    assert_eq!(
        unread_count(&pool, &conversation.id, "alice").await.unwrap(),
        1
    );
}
