use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{PermissionListing, Principal};
use crate::db::principals::{fetch_driver_by_phone, fetch_user_by_email, load_role_for};
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthPrincipal;
use crate::models::driver::{AuthenticatedDriver, Driver, DriverAuthResponse, DriverLoginRequest};
use crate::models::user::{AuthResponse, LoginRequest, User};
use crate::utils::verify_password_or_dummy;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionsResponse {
    #[schema(value_type = Object, nullable)]
    pub permissions: PermissionListing,
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("invalid credentials")
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let db_user = fetch_user_by_email(&state.pool, &payload.email).await?;
    let verified = verify_password_or_dummy(&payload.password, db_user.as_ref().map(|u| u.password_hash.as_str()))?;
    let db_user = match db_user {
        Some(db_user) if verified => db_user,
        _ => return Err(invalid_credentials()),
    };

    if !db_user.status.is_active() {
        tracing::info!(user_id = %db_user.id, status = %db_user.status, "login refused for inactive user");
        return Err(invalid_credentials());
    }

    let token = state.jwt.encode_user(db_user.id)?;
    let user: User = load_role_for(&state.pool, db_user).await?.into();

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    post,
    path = "/auth/driver/login",
    tag = "Auth",
    request_body = DriverLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = DriverAuthResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn driver_login(
    State(state): State<AppState>,
    Json(payload): Json<DriverLoginRequest>,
) -> AppResult<Json<DriverAuthResponse>> {
    let db_driver = fetch_driver_by_phone(&state.pool, &payload.phone).await?;
    let verified = verify_password_or_dummy(&payload.password, db_driver.as_ref().map(|d| d.password_hash.as_str()))?;
    let db_driver = match db_driver {
        Some(db_driver) if verified => db_driver,
        _ => return Err(invalid_credentials()),
    };

    if !db_driver.status.is_active() {
        tracing::info!(driver_id = %db_driver.id, status = %db_driver.status, "login refused for inactive driver");
        return Err(invalid_credentials());
    }

    let token = state.jwt.encode_driver(db_driver.id, db_driver.company_id)?;
    let driver = AuthenticatedDriver::from(Driver::from(db_driver));

    tracing::info!(driver_id = %driver.driver_id, company_id = %driver.company_id, "driver logged in");
    Ok(Json(DriverAuthResponse { token, driver }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated principal, tagged by `type` (user or driver)", body = Principal),
        (status = 401, description = "Missing token, or principal not found or inactive")
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(auth: AuthPrincipal) -> AppResult<Json<Principal>> {
    Ok(Json(auth.into_inner()))
}

#[utoipa::path(
    get,
    path = "/auth/permissions",
    tag = "Auth",
    responses(
        (status = 200, description = "Permission table of the caller, or null", body = PermissionsResponse),
        (status = 401, description = "Missing token, or principal not found or inactive")
    ),
    security(("bearerAuth" = []))
)]
pub async fn permissions(auth: AuthPrincipal) -> AppResult<Json<PermissionsResponse>> {
    Ok(Json(PermissionsResponse {
        permissions: auth.permission_listing(),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged", body = MessageResponse)),
    security(("bearerAuth" = []))
)]
pub async fn logout(_auth: AuthPrincipal) -> AppResult<Json<MessageResponse>> {
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
