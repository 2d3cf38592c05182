// src/handlers/seasons.rs
//
// Thin HTTP layer over the season lifecycle engine; one handler per engine
// operation, nothing but extraction and status codes here.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::auth::AuthFarmer;
use crate::models::{
    ActualActivityCreate, PlannedActivityCreate, SeasonCreate, SeasonDetails, SeasonPlan,
    SeasonSummary, SeasonUpdate,
};
use crate::validation::ValidatedJson;
use crate::{clock, engine, AppError, AppState};

// --- 1. Create season (POST /seasons) ---
pub async fn create_season_handler(
    farmer: AuthFarmer,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SeasonCreate>,
) -> Result<(StatusCode, Json<SeasonPlan>), AppError> {
    let season = engine::create_season(&state.db, farmer.id, payload).await?;
    Ok((StatusCode::CREATED, Json(season)))
}

// --- 2. Update season (PUT /seasons/:id) ---
pub async fn update_season_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SeasonUpdate>,
) -> Result<Json<SeasonPlan>, AppError> {
    let season = engine::update_season(&state.db, id, farmer.id, payload).await?;
    Ok(Json(season))
}

// --- 3. Add planned activities (POST /seasons/:id/planned-activities) ---
pub async fn add_planned_activities_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
    Json(items): Json<Vec<PlannedActivityCreate>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    for item in &items {
        item.validate()?;
    }

    engine::add_planned_activities(&state.db, id, farmer.id, items, clock::today()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Planned activities added successfully"})),
    ))
}

// --- 4. Add actual activities (POST /seasons/:id/actual-activities) ---
pub async fn add_actual_activities_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
    Json(items): Json<Vec<ActualActivityCreate>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    for item in &items {
        item.validate()?;
    }

    engine::add_actual_activities(&state.db, id, farmer.id, items).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Actual activities added successfully"})),
    ))
}

// --- 5. Season details (GET /seasons/:id) ---
pub async fn get_season_details_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
) -> Result<Json<SeasonDetails>, AppError> {
    let details = engine::season_details(&state.db, id, farmer.id, clock::today()).await?;
    Ok(Json(details))
}

// --- 6. Season summary (GET /seasons/:id/summary) ---
pub async fn get_season_summary_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
) -> Result<Json<SeasonSummary>, AppError> {
    let summary = engine::season_summary(&state.db, id, farmer.id, clock::today()).await?;
    Ok(Json(summary))
}
