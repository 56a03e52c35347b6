use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStatus, NewUser, Role};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = normalize_email(&payload.email);

    if payload.full_name.trim().chars().count() < 2 {
        return Err(ApiError::Validation(
            "Full name must be at least 2 characters".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!("signup with invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    // Public signup never assigns any role but `user`.
    let user = state
        .store
        .create(NewUser {
            full_name: payload.full_name.trim().to_string(),
            email: payload.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);

    // Unknown email and wrong password take the same exit so callers cannot
    // probe which addresses are registered.
    let user = match state.store.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!("login for unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    // Status is checked only after the password proves account ownership, so
    // this error reveals nothing to a caller without valid credentials.
    if user.status == AccountStatus::Inactive {
        warn!(user_id = %user.id, "login for deactivated account");
        return Err(ApiError::AccountDeactivated);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

/// Tokens are self-contained with no server-side store, so logout has nothing
/// to revoke; the client discards its token.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(AuthUser(user): AuthUser) -> Json<Value> {
    info!(user_id = %user.id, "user logged out");
    Json(json!({ "message": "Logged out" }))
}
