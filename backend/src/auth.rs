//! Bcrypt password digests, bearer tokens and the [`AuthUser`] extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::User;
use crate::AppState;

const TOKEN_LIFETIME_HOURS: i64 = 24;
const PASSWORD_COST: u32 = 10;

/// Bcrypt digest of `password`. Runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_COST))
        .await
        .map_err(|err| ApiError::Password(err.to_string()))?
        .map_err(|err| ApiError::Password(err.to_string()))
}

pub async fn verify_password(password: String, user: &User) -> Result<bool, ApiError> {
    let digest = user.password_hash.clone();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest))
        .await
        .map_err(|err| ApiError::Password(err.to_string()))?
        .map_err(|err| ApiError::Password(err.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: u64,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(user_id: u64, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let issued = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: issued.timestamp(),
        exp: (issued + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// The caller behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) if !value.is_empty() => value
                .to_str()
                .map_err(|_| ApiError::Unauthorized("malformed auth token"))?,
            _ => return Err(ApiError::Unauthorized("missing auth token")),
        };

        let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
            ["Bearer", token] => *token,
            _ => return Err(ApiError::Unauthorized("malformed auth token")),
        };

        let claims = verify_token(token, &state.jwt_secret).map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            ApiError::Unauthorized("invalid auth token")
        })?;

        let user = state
            .store
            .user_by_id(claims.sub)
            .await?
            .ok_or(ApiError::Unauthorized("user not found"))?;

        Ok(AuthUser(user))
    }
}
