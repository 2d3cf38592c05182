// src/auth.rs
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::AppError;
use crate::AppState;

// --- 1. Password handling (Argon2) ---

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// --- 2. Access tokens (HS256) ---

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // farmer id
    pub exp: usize,
}

pub fn create_jwt(farmer_id: i32, config: &Config) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(config.jwt_ttl_minutes))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: farmer_id,
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

// --- 3. Extractors ---

/// The authenticated farmer behind a `Authorization: Bearer <jwt>` header.
/// Handlers take `farmer: AuthFarmer` to require a valid token.
pub struct AuthFarmer {
    pub id: i32,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthFarmer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized("Missing or malformed bearer token".into()))?;

        let claims = verify_jwt(bearer.token(), &state.config.jwt_secret).map_err(|e| {
            tracing::warn!("JWT rejected: {}", e);
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthFarmer { id: claims.sub })
    }
}

/// Elevated access for farmer administration, via the `admin-key` header.
pub struct AdminKey;

#[async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get("admin-key")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing admin key".into()))?;

        if provided != state.config.admin_key {
            return Err(AppError::Unauthorized("Invalid admin key".into()));
        }

        Ok(AdminKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".into(),
            jwt_secret: "test-secret".into(),
            jwt_ttl_minutes: 15,
            admin_key: "test-admin".into(),
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("hunter42").unwrap();
        assert!(verify_password("hunter42", &hash));
        assert!(!verify_password("hunter43", &hash));
        assert!(!verify_password("hunter42", "not-a-phc-string"));
    }

    #[test]
    fn jwt_round_trips_farmer_id() {
        let config = test_config();
        let token = create_jwt(42, &config).unwrap();
        let claims = verify_jwt(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn jwt_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let token = create_jwt(42, &config).unwrap();
        assert!(verify_jwt(&token, "other-secret").is_err());
    }
}
