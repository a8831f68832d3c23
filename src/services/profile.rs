use crate::database::DbPool;
use crate::models::profile::Profile;
use crate::utils::error::{AppError, AppResult};
use sqlx::Row;

pub async fn find_profile(pool: &DbPool, user_id: &str) -> AppResult<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool.as_ref())
        .await?;

    Ok(profile)
}

pub async fn get_profile(pool: &DbPool, user_id: &str) -> AppResult<Profile> {
    find_profile(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn profile_exists(pool: &DbPool, user_id: &str) -> AppResult<bool> {
    let count = sqlx::query("SELECT COUNT(*) as count FROM profiles WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    Ok(count > 0)
}
