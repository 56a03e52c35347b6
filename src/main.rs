mod admin;
mod app;
mod auth;
mod config;
mod error;
mod state;
mod store;
mod users;

use crate::state::AppState;
use crate::store::{NewUser, Role};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    ensure_admin(&app_state).await?;

    let app = app::build_app(app_state);
    app::serve(app).await
}

/// Out-of-band admin provisioning. The only code path that assigns the admin
/// role; no HTTP route can.
async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let Some(ref bootstrap) = state.config.admin_bootstrap else {
        return Ok(());
    };

    let email = auth::handlers::normalize_email(&bootstrap.email);
    if state.store.find_by_email(&email).await?.is_some() {
        tracing::info!(%email, "admin account already exists");
        return Ok(());
    }

    let password_hash = auth::password::hash_password(&bootstrap.password)?;
    let admin = state
        .store
        .create(NewUser {
            full_name: bootstrap.full_name.clone(),
            email,
            password_hash,
            role: Role::Admin,
        })
        .await?;
    tracing::info!(admin_id = %admin.id, "admin account created");
    Ok(())
}
