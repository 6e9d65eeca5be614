use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::validation::{validate_login, validate_registration};
use crate::db::{User, UserResponse};
use crate::token;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash. Fails closed on a corrupted digest:
/// the caller cannot distinguish "wrong password" from "bad digest".
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Build the session cookie with the attributes shared by login and logout.
fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(state.config.environment.is_production())
        .max_age(time::Duration::hours(state.config.auth.token_ttl_hours))
        .build()
}

async fn db_pool(state: &AppState) -> Result<&crate::db::DbPool, ApiError> {
    state.db.pool().await.map_err(|e| {
        tracing::error!("Database connection failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })
}

/// POST /api/auth/signup — register a new user.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let errors = validate_registration(
        &request.firstname,
        &request.lastname,
        &request.email,
        &request.password,
    );
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let email = request.email.to_lowercase();
    let pool = db_pool(&state).await?;

    // Fast-path duplicate check. Not linearizable on its own: a concurrent
    // signup may pass it too, in which case the unique index on insert is
    // the final arbiter and maps to the same 409.
    if User::find_by_email(pool, &email).await?.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let password_hash =
        hash_password(&request.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let user = User::insert(
        pool,
        &request.firstname,
        &request.lastname,
        &email,
        &password_hash,
    )
    .await?;

    tracing::info!(email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": UserResponse::from(user),
        })),
    ))
}

/// POST /api/auth/login — authenticate and mint a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let errors = validate_login(&request.email, &request.password);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let email = request.email.to_lowercase();
    let pool = db_pool(&state).await?;

    // Unknown email and wrong password return identical responses to
    // prevent account enumeration.
    let user = User::find_by_email(pool, &email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = token::issue(
        &state.config.auth.jwt_secret,
        &user.id,
        &user.email,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| ApiError::internal(e.to_string()))?;

    let jar = jar.add(session_cookie(&state, token.clone()));

    tracing::info!(email = %user.email, "user logged in");

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "token": token,
            "user": UserResponse::from(user),
        })),
    ))
}

/// POST /api/auth/logout — clear the session cookie.
///
/// Stateless: a token the client copied out of the cookie stays valid until
/// its embedded expiry.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(session_cookie(&state, String::new()));
    (jar, Json(json!({ "message": "Logged out successfully" })))
}
