use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::dto::{ChangePasswordRequest, UpdateProfileRequest};
use crate::auth::dto::PublicUser;
use crate::auth::extractors::AuthUser;
use crate::auth::handlers::{is_valid_email, normalize_email};
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::ProfileChanges;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/change-password", put(change_password))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let full_name = match payload.full_name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.chars().count() < 2 {
                return Err(ApiError::Validation(
                    "Full name must be at least 2 characters".into(),
                ));
            }
            Some(name)
        }
        None => None,
    };

    let email = match payload.email {
        Some(email) => {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                warn!("profile update with invalid email");
                return Err(ApiError::Validation("Invalid email".into()));
            }
            Some(email)
        }
        None => None,
    };

    let updated = state
        .store
        .update_profile(user.id, ProfileChanges { full_name, email })
        .await?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(PublicUser::from(&updated)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.new_password.len() < 6 {
        return Err(ApiError::Validation(
            "New password must be at least 6 characters".into(),
        ));
    }

    // Fails closed: holding a valid token is not enough to rotate the
    // password, the current one must be proven again.
    if !verify_password(&payload.current_password, &user.password_hash) {
        warn!(user_id = %user.id, "change-password with wrong current password");
        return Err(ApiError::InvalidCredentials);
    }

    let password_hash = hash_password(&payload.new_password)?;
    state.store.update_password(user.id, &password_hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(json!({ "message": "Password changed" })))
}
