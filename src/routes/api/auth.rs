use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ApiResponse, ApiResult, AppError, Ctx, entities::{Session, User}};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// ============ Handlers ============

/// Register a new account
/// POST /api/auth/register
async fn register(State(ctx): State<Ctx>, Json(req): Json<RegisterRequest>) -> ApiResult<()> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?
        .to_string();

    User::create(&ctx.db, &req.username, &hash)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation("Username already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;

    Ok(ApiResponse {
        code: 201,
        message: "User registered successfully".to_string(),
        data: None,
    })
}

/// Log in and receive a session token
/// POST /api/auth/login
async fn login(State(ctx): State<Ctx>, Json(req): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let user = User::find_by_username(&ctx.db, &req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored hash is invalid: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &hash)
        .map_err(|_| AppError::Unauthorized)?;

    let token = Session::create(&ctx.db, user.id).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Login successful".to_string(),
        data: Some(LoginResponse { token, user }),
    })
}

/// Mount auth routes
pub fn mount() -> Router<Ctx> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}
