use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
};
use std::sync::Arc;

use crate::api::AppState;
use crate::models::profile::ProfileResponse;
use crate::services::profile::get_profile;
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_user_id, json_response};

async fn get_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let caller_id = extract_user_id(&headers)?;
    let profile = get_profile(&state.db, &caller_id).await?;
    Ok(json_response(&ProfileResponse::from(profile)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = get_profile(&state.db, &user_id).await?;
    Ok(json_response(&ProfileResponse::from(profile)))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/me", get(get_me))
        .route("/:user_id", get(get_user))
        .with_state(state)
}
