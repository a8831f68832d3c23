use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::AppState;
use crate::database;
use crate::utils::jwt::JwtService;

pub async fn register_routes() -> Router {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://atelier.db?mode=rwc".to_string());

    let db = database::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Database connected and migrations applied");

    let jwt_service = Arc::new(JwtService::from_env().expect("Failed to initialize JWT service"));

    let state = Arc::new(AppState { db, jwt_service });

    let api_routes = crate::api::routes(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
