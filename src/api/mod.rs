pub mod conversations;
pub mod profiles;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::database::DbPool;
use crate::utils::jwt::JwtService;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: Arc<JwtService>,
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .nest("/conversations", conversations::routes(state.clone()))
        .nest("/users", profiles::routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
}
