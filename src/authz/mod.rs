//! Authorization module - principal resolution and the permission read model
//!
//! - Bearer-token subjects resolve to an active user or driver
//! - Users carry a fixed module x permission-kind table through their role
//! - Permission checks fail closed: a missing table or flag is a denial

mod permissions;
mod principal;
mod resolver;

pub use permissions::{
    has_delete_permission, has_export_permission, has_permission, has_read_permission, has_update_permission,
    has_write_permission, permission_listing, Module, PermissionKind, PermissionListing, PermissionMap, Permissions,
};
pub use principal::Principal;
pub use resolver::{PrincipalResolver, PrincipalStore};
