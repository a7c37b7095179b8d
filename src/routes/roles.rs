//! Read-only role endpoints, gated on `Roles:Read`.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Module, PermissionKind};
use crate::db::principals;
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthPrincipal;
use crate::models::role::{Role, RoleSummary};

#[utoipa::path(
    get,
    path = "/roles",
    tag = "Roles",
    responses(
        (status = 200, description = "List of roles", body = Vec<RoleSummary>),
        (status = 403, description = "Caller lacks Roles:Read")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> AppResult<Json<Vec<RoleSummary>>> {
    auth.require(Module::Roles, PermissionKind::Read)?;

    let roles = principals::list_roles(&state.pool).await?;
    Ok(Json(roles.iter().map(RoleSummary::from).collect()))
}

#[utoipa::path(
    get,
    path = "/roles/{id}",
    tag = "Roles",
    params(
        ("id" = Uuid, Path, description = "Role ID"),
    ),
    responses(
        (status = 200, description = "Role with its permission table", body = Role),
        (status = 403, description = "Caller lacks Roles:Read"),
        (status = 404, description = "Role not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Role>> {
    auth.require(Module::Roles, PermissionKind::Read)?;

    let role = principals::fetch_role_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("role not found"))?;

    Ok(Json(role))
}
