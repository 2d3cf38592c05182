// src/main.rs
use axum::{
    http::Method,
    routing::{delete, get, post, put},
    Json, Router,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod clock;
mod config;
mod engine;
mod error;
mod handlers;
mod models;
mod validation;

pub use error::AppError;

use config::Config;
use handlers::farmers::*;
use handlers::farms::*;
use handlers::seasons::*;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    tracing::info!("✅ connected to Postgres");

    let state = AppState { db: pool, config };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        // farmers
        .route("/farmers", get(list_farmers_handler))
        .route("/farmers", post(create_farmer_handler))
        .route("/farmers/login", post(login_farmer_handler))
        .route("/farmers/:id", delete(delete_farmer_handler))
        // farms
        .route("/farms", get(list_farms_handler))
        .route("/farms", post(create_farm_handler))
        .route("/farms/:id", put(update_farm_handler))
        .route("/farms/:id", delete(delete_farm_handler))
        // seasons
        .route("/seasons", post(create_season_handler))
        .route("/seasons/:id", get(get_season_details_handler))
        .route("/seasons/:id", put(update_season_handler))
        .route("/seasons/:id/planned-activities", post(add_planned_activities_handler))
        .route("/seasons/:id/actual-activities", post(add_actual_activities_handler))
        .route("/seasons/:id/summary", get(get_season_summary_handler))
        .with_state(state)
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
