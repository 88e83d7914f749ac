//! Handlers for the `/auth` resource (register, login, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hostel_core::error::CoreError;
use hostel_core::roles::{is_valid_role, ROLE_ADMIN, ROLE_STUDENT};
use hostel_db::models::user::{CreateUser, User, UserResponse};
use hostel_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    #[serde(alias = "roomNo")]
    pub room_number: Option<String>,
    pub hostel: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// The portal the user is signing into; must match the stored role.
    pub role: Option<String>,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Resolve the role a new account gets. Requests for `admin` are downgraded
/// to `student` unless admin self-registration is enabled.
fn resolve_registration_role(
    requested: Option<&str>,
    allow_admin: bool,
) -> Result<&'static str, CoreError> {
    match requested.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(ROLE_STUDENT),
        Some(role) if !is_valid_role(role) => Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be 'student' or 'admin'"
        ))),
        Some(ROLE_ADMIN) if allow_admin => Ok(ROLE_ADMIN),
        Some(_) => Ok(ROLE_STUDENT),
    }
}

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let role = resolve_registration_role(
        input.role.as_deref(),
        state.config.allow_admin_registration,
    )?;

    let email = normalize_email(&input.email);
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    // A concurrent registration still trips `uq_users_email` and maps to 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email,
            password_hash,
            role: role.to_string(),
            room_number: input.room_number,
            hostel: input.hostel,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    let response = auth_response(&state, user)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(response).with_message("User registered successfully")),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    input.validate()?;
    let requested_role = input.role.as_deref().map(str::trim).filter(|r| !r.is_empty());
    if let Some(role) = requested_role {
        if !is_valid_role(role) {
            return Err(AppError::Core(CoreError::Validation(
                "Invalid role. Must be 'student' or 'admin'".into(),
            )));
        }
    }

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    if requested_role.is_some_and(|role| role != user.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Unauthorized role access".into(),
        )));
    }

    tracing::info!(user_id = user.id, "User logged in");
    let response = auth_response(&state, user)?;
    Ok(Json(ApiResponse::ok(response).with_message("Login successful")))
}

/// GET /api/v1/auth/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}
