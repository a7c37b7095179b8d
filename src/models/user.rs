use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::Permissions;
use crate::models::role::Role;
use crate::models::status::Status;

/// Public view of a system user. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: Status,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn permissions(&self) -> Option<&Permissions> {
        self.role.as_ref().map(|role| &role.permissions)
    }
}

#[derive(Debug, Clone)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub status: Status,
    pub role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user row joined with its role, as loaded for authentication.
#[derive(Debug, Clone)]
pub struct UserWithRole {
    pub user: DbUser,
    pub role: Option<Role>,
}

impl From<UserWithRole> for User {
    fn from(value: UserWithRole) -> Self {
        let UserWithRole { user, role } = value;
        User {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
            role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "dispatch@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
