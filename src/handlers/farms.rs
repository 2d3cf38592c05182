// src/handlers/farms.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthFarmer;
use crate::models::{Farm, FarmCreate, FarmListQuery, FarmUpdate};
use crate::validation::ValidatedJson;
use crate::{AppError, AppState};

// --- 1. List farms (GET /farms) ---
pub async fn list_farms_handler(
    auth: Option<AuthFarmer>,
    Query(query): Query<FarmListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Farm>>, AppError> {
    // Admin branch: a valid admin_key query parameter sees every farm,
    // optionally narrowed to one farmer.
    if let Some(key) = query.admin_key {
        if key != state.config.admin_key {
            return Err(AppError::Unauthorized("Invalid admin key".to_string()));
        }
        let farms = match query.farmer_id {
            Some(farmer_id) => {
                sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE farmer_id = $1 ORDER BY id")
                    .bind(farmer_id)
                    .fetch_all(&state.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Farm>("SELECT * FROM farms ORDER BY id")
                    .fetch_all(&state.db)
                    .await?
            }
        };
        return Ok(Json(farms));
    }

    let farmer = auth.ok_or_else(|| {
        AppError::Unauthorized("Missing or malformed bearer token".to_string())
    })?;

    // Farmers only ever see their own farms; naming anyone else is denied.
    if let Some(farmer_id) = query.farmer_id {
        if farmer_id != farmer.id {
            return Err(AppError::Forbidden(
                "You can only access your own farms".to_string(),
            ));
        }
    }

    let farms = sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE farmer_id = $1 ORDER BY id")
        .bind(farmer.id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(farms))
}

// --- 2. Create farm (POST /farms) ---
pub async fn create_farm_handler(
    farmer: AuthFarmer,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<FarmCreate>,
) -> Result<(StatusCode, Json<Farm>), AppError> {
    if payload.farmer_id != farmer.id {
        return Err(AppError::Forbidden(
            "You can only create farms for your own account".to_string(),
        ));
    }

    let farm = sqlx::query_as::<_, Farm>(
        "INSERT INTO farms (farmer_id, name, size_acres)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(payload.farmer_id)
    .bind(payload.name)
    .bind(payload.size_acres)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(farm)))
}

// --- 3. Update farm (PUT /farms/:id) ---
pub async fn update_farm_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<FarmUpdate>,
) -> Result<Json<Farm>, AppError> {
    let existing = sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm not found".to_string()))?;

    if existing.farmer_id != farmer.id {
        return Err(AppError::Forbidden(
            "You can only update your own farms".to_string(),
        ));
    }

    let farm = sqlx::query_as::<_, Farm>(
        "UPDATE farms SET
            name = COALESCE($1, name),
            size_acres = COALESCE($2, size_acres)
         WHERE id = $3
         RETURNING *",
    )
    .bind(payload.name)
    .bind(payload.size_acres)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(farm))
}

// --- 4. Delete farm (DELETE /farms/:id) ---
pub async fn delete_farm_handler(
    Path(id): Path<i32>,
    farmer: AuthFarmer,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let existing = sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm not found".to_string()))?;

    if existing.farmer_id != farmer.id {
        return Err(AppError::Forbidden(
            "You can only delete your own farms".to_string(),
        ));
    }

    sqlx::query("DELETE FROM farms WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
