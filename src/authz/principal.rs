use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::driver::AuthenticatedDriver;
use crate::models::user::User;

use super::permissions::{has_permission, permission_listing, Module, PermissionKind, PermissionListing, Permissions};

/// Principal represents the authenticated caller attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    User(User),
    Driver(AuthenticatedDriver),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::User(user) => user.id,
            Principal::Driver(driver) => driver.driver_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Principal::User(_) => "user",
            Principal::Driver(_) => "driver",
        }
    }

    /// Drivers carry no role, so they never have a table.
    pub fn permissions(&self) -> Option<&Permissions> {
        match self {
            Principal::User(user) => user.permissions(),
            Principal::Driver(_) => None,
        }
    }

    pub fn can(&self, module: Module, kind: PermissionKind) -> bool {
        has_permission(self.permissions(), module, kind)
    }

    pub fn permission_listing(&self) -> PermissionListing {
        permission_listing(self.permissions())
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Principal::User(user) => Some(user),
            Principal::Driver(_) => None,
        }
    }

    pub fn as_driver(&self) -> Option<&AuthenticatedDriver> {
        match self {
            Principal::User(_) => None,
            Principal::Driver(driver) => Some(driver),
        }
    }
}
