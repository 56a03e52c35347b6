use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::{JwtKeys, TokenError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStatus, Role, User};

/// Authentication gate: resolves a bearer token to a live, active user.
/// Every failure is terminal for the request and maps to a stable error kind.
pub async fn authenticate(
    state: &AppState,
    authorization: Option<&str>,
) -> Result<User, ApiError> {
    let token = authorization
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .ok_or(ApiError::MissingToken)?;

    let claims = JwtKeys::from_ref(state).verify(token).map_err(|e| {
        warn!(error = %e, "token rejected");
        match e {
            TokenError::Expired => ApiError::ExpiredToken,
            TokenError::Malformed => ApiError::MalformedToken,
        }
    })?;

    let user = state
        .store
        .find_by_id(claims.sub)
        .await
        .map_err(ApiError::from)?
        // Covers a deleted-but-still-tokened account.
        .ok_or(ApiError::UnknownUser)?;

    if user.status == AccountStatus::Inactive {
        warn!(user_id = %user.id, "deactivated account rejected");
        return Err(ApiError::AccountDeactivated);
    }

    Ok(user)
}

/// Extracts the authenticated user from the Authorization header.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let user = authenticate(state, authorization).await?;
        Ok(AuthUser(user))
    }
}

/// Authorization gate layered on `AuthUser`: admits only admins. Nesting the
/// extractors means the role check cannot run without authentication first.
#[derive(Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "admin route denied");
            return Err(ApiError::InsufficientRole);
        }
        Ok(AdminUser(user))
    }
}
