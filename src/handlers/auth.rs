// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{Identity, LoginRequest, MeResponse, Role, User},
    utils::{
        hash::verify_password,
        jwt::sign_jwt,
        text::{Casing, display_name, partition_key},
    },
};

/// Authenticates a user and returns a JWT token.
///
/// The response also names the screen the client should open next:
/// the admin panel for administrators, the dashboard for students.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, role, first_name, last_name, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("Invalid e-mail or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid e-mail or password".to_string()));
    }

    let role = user
        .role
        .parse::<Role>()
        .map_err(AppError::InternalServerError)?;

    let expiration = if payload.remember {
        config.jwt_remember_expiration
    } else {
        config.jwt_expiration
    };

    let token = sign_jwt(user.id, &user.email, role, &config.jwt_secret, expiration)?;

    tracing::info!(user_id = user.id, role = %role, "User logged in");

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": role,
        "expires_in": expiration,
        "redirect": match role {
            Role::Admin => "/admin",
            Role::Student => "/dashboard",
        },
    })))
}

/// Returns the current user's profile and student key.
pub async fn me(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let profile = load_profile(&pool, &identity, config.partition_casing).await?;
    Ok(Json(profile))
}

/// Loads the caller's profile, deriving display name and student key.
pub(crate) async fn load_profile(
    pool: &SqlitePool,
    identity: &Identity,
    casing: Casing,
) -> Result<MeResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, role, first_name, last_name, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(identity.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::AuthError("Account no longer exists".to_string()))?;

    let display = display_name(&user.first_name, &user.last_name, &user.email, casing);
    let student_key = partition_key(&display, casing);

    Ok(MeResponse {
        id: user.id,
        email: user.email,
        role: identity.role,
        first_name: casing.title(&user.first_name),
        last_name: casing.title(&user.last_name),
        display_name: display,
        student_key,
        created_at: user.created_at,
    })
}
