use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{ListUsersQuery, ListUsersResponse, Pagination};
use crate::auth::dto::PublicUser;
use crate::auth::extractors::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::AccountStatus;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:user_id/activate", patch(activate_user))
        .route("/admin/users/:user_id/deactivate", patch(deactivate_user))
}

#[instrument(skip(state, _admin), fields(admin_id = %_admin.0.id))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let (users, total_users) = state.store.list_page(page, limit).await?;
    let total_pages = total_users.div_ceil(limit as u64);

    Ok(Json(ListUsersResponse {
        users: users.iter().map(PublicUser::from).collect(),
        pagination: Pagination {
            page,
            limit,
            total_users,
            total_pages,
        },
    }))
}

async fn set_status(
    state: &AppState,
    acting_admin_id: Uuid,
    target: Uuid,
    status: AccountStatus,
) -> Result<Json<PublicUser>, ApiError> {
    // Idempotent: re-applying the current status is a no-op success.
    let user = state.store.set_status(target, status).await?;
    info!(admin_id = %acting_admin_id, user_id = %user.id, status = ?user.status, "account status set");
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn activate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    set_status(&state, admin.id, user_id, AccountStatus::Active).await
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    set_status(&state, admin.id, user_id, AccountStatus::Inactive).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::store::{NewUser, Role, User};

    async fn seed(state: &AppState, name: &str, email: &str, role: Role) -> User {
        state
            .store
            .create(NewUser {
                full_name: name.into(),
                email: email.into(),
                password_hash: hash_password("password123").unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    fn query(page: Option<u32>, limit: Option<u32>) -> Query<ListUsersQuery> {
        Query(ListUsersQuery { page, limit })
    }

    #[tokio::test]
    async fn list_users_pagination_math() {
        let state = AppState::fake();
        let admin = seed(&state, "Root", "root@example.com", Role::Admin).await;
        for i in 0..24 {
            seed(&state, &format!("User {i}"), &format!("u{i}@example.com"), Role::User).await;
        }

        // 25 users including the admin.
        let Json(resp) = list_users(
            State(state.clone()),
            AdminUser(admin.clone()),
            query(Some(1), Some(10)),
        )
        .await
        .unwrap();
        assert_eq!(resp.users.len(), 10);
        assert_eq!(resp.pagination.total_users, 25);
        assert_eq!(resp.pagination.total_pages, 3);
        assert_eq!(resp.users[0].id, admin.id);

        let Json(resp) = list_users(
            State(state.clone()),
            AdminUser(admin.clone()),
            query(Some(3), Some(10)),
        )
        .await
        .unwrap();
        assert_eq!(resp.users.len(), 5);

        // Out-of-range page: empty slice, not an error.
        let Json(resp) = list_users(
            State(state),
            AdminUser(admin),
            query(Some(4), Some(10)),
        )
        .await
        .unwrap();
        assert!(resp.users.is_empty());
        assert_eq!(resp.pagination.total_users, 25);
    }

    #[tokio::test]
    async fn list_users_defaults_and_clamps() {
        let state = AppState::fake();
        let admin = seed(&state, "Root", "root@example.com", Role::Admin).await;

        let Json(resp) = list_users(
            State(state.clone()),
            AdminUser(admin.clone()),
            query(None, None),
        )
        .await
        .unwrap();
        assert_eq!(resp.pagination.page, 1);
        assert_eq!(resp.pagination.limit, 10);

        let Json(resp) = list_users(State(state), AdminUser(admin), query(Some(0), Some(0)))
            .await
            .unwrap();
        assert_eq!(resp.pagination.page, 1);
        assert_eq!(resp.pagination.limit, 1);
    }

    #[tokio::test]
    async fn deactivate_then_activate_roundtrip() {
        let state = AppState::fake();
        let admin = seed(&state, "Root", "root@example.com", Role::Admin).await;
        let user = seed(&state, "Target", "target@example.com", Role::User).await;

        let Json(updated) = deactivate_user(
            State(state.clone()),
            AdminUser(admin.clone()),
            Path(user.id),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, AccountStatus::Inactive);
        // Deactivation leaves the role untouched.
        assert_eq!(updated.role, Role::User);

        // Idempotent on repeat.
        let Json(updated) = deactivate_user(
            State(state.clone()),
            AdminUser(admin.clone()),
            Path(user.id),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, AccountStatus::Inactive);

        let Json(updated) = activate_user(State(state), AdminUser(admin), Path(user.id))
            .await
            .unwrap();
        assert_eq!(updated.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn status_change_for_unknown_user_is_not_found() {
        let state = AppState::fake();
        let admin = seed(&state, "Root", "root@example.com", Role::Admin).await;

        let err = deactivate_user(State(state), AdminUser(admin), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
