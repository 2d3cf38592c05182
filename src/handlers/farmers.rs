// src/handlers/farmers.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{create_jwt, hash_password, verify_password, AdminKey};
use crate::models::{Farmer, FarmerCreate, FarmerLogin, FarmerOut, LoginResponse};
use crate::validation::ValidatedJson;
use crate::{clock, AppError, AppState};

// --- 1. List farmers (GET /farmers, admin only) ---
pub async fn list_farmers_handler(
    _admin: AdminKey,
    State(state): State<AppState>,
) -> Result<Json<Vec<FarmerOut>>, AppError> {
    let farmers = sqlx::query_as::<_, FarmerOut>(
        "SELECT id, name, phone_number, email FROM farmers ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(farmers))
}

// --- 2. Register farmer (POST /farmers, admin only) ---
pub async fn create_farmer_handler(
    _admin: AdminKey,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<FarmerCreate>,
) -> Result<(StatusCode, Json<FarmerOut>), AppError> {
    // Pre-check uniqueness so callers get a readable message instead of the
    // constraint violation.
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM farmers WHERE phone_number = $1")
        .bind(&payload.phone_number)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "Farmer with given phone number already exists".to_string(),
        ));
    }

    if let Some(email) = &payload.email {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM farmers WHERE email = $1")
            .bind(email)
            .fetch_optional(&state.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::BadRequest(
                "Farmer with given email already exists".to_string(),
            ));
        }
    }

    let password_hash = hash_password(&payload.password).map_err(|_| AppError::Internal)?;

    let farmer = sqlx::query_as::<_, FarmerOut>(
        "INSERT INTO farmers (name, phone_number, email, gender, password_hash, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, name, phone_number, email",
    )
    .bind(&payload.name)
    .bind(&payload.phone_number)
    .bind(&payload.email)
    .bind(&payload.gender)
    .bind(password_hash)
    .bind(clock::today())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(farmer)))
}

// --- 3. Login (POST /farmers/login) ---
pub async fn login_farmer_handler(
    State(state): State<AppState>,
    Json(payload): Json<FarmerLogin>,
) -> Result<Json<LoginResponse>, AppError> {
    // One message for both failure modes; don't reveal which was wrong.
    let farmer = sqlx::query_as::<_, Farmer>("SELECT * FROM farmers WHERE phone_number = $1")
        .bind(&payload.phone_number)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid phone number or password".to_string()))?;

    if !verify_password(&payload.password, &farmer.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid phone number or password".to_string(),
        ));
    }

    let token = create_jwt(farmer.id, &state.config).map_err(|_| AppError::Internal)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        farmer_id: farmer.id,
        jwt_access_token: token,
    }))
}

// --- 4. Delete farmer (DELETE /farmers/:id, admin only) ---
pub async fn delete_farmer_handler(
    _admin: AdminKey,
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    // Farms, seasons and activities go with the farmer via FK cascade.
    let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Farmer not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
