use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use taskflow_shared::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::auth;
use crate::error::ApiError;
use crate::store::{NewUser, StoreError};
use crate::AppState;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

fn validate_registration(input: &RegisterRequest) -> Result<(), ApiError> {
    if input.username.chars().count() < MIN_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if !looks_like_email(&input.email) {
        return Err(ApiError::BadRequest("email is not valid".to_string()));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(input) = payload?;
    validate_registration(&input)?;

    let new_user = NewUser {
        password_hash: auth::hash_password(input.password).await?,
        username: input.username,
        email: input.email,
    };

    let user = state
        .store
        .create_user(new_user)
        .await
        .map_err(|err| match err {
            StoreError::Conflict => ApiError::UserExists,
            other => ApiError::Store(other),
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "registered user");
    Ok(Json(RegisterResponse {
        message: "registered".to_string(),
        user: user.info(),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(input) = payload?;
    if input.username.is_empty() || input.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let user = state.store.user_by_username(&input.username).await?;
    let verified = match &user {
        Some(user) => auth::verify_password(input.password, user).await?,
        None => false,
    };
    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::info!(username = %input.username, "failed login");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = auth::issue_token(user.id, &state.jwt_secret).map_err(ApiError::Token)?;

    tracing::info!(user_id = user.id, "logged in");
    Ok(Json(LoginResponse {
        message: "logged in".to_string(),
        token,
        user: user.info(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration(&request("bob", "secret", "b@x.io")).is_ok());
        assert!(validate_registration(&request("bo", "secret", "b@x.io")).is_err());
        assert!(validate_registration(&request("bob", "12345", "b@x.io")).is_err());
        assert!(validate_registration(&request("bob", "secret", "bob")).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a@.co"));
        assert!(!looks_like_email("a@b@c.co"));
        assert!(!looks_like_email("a b@c.co"));
    }
}
