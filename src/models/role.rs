use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::Permissions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    #[schema(example = "Dispatcher")]
    pub name: String,
    /// Module -> permission kind -> granted
    #[schema(value_type = Object, example = json!({"Orders": {"Read": true, "Write": false}}))]
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact listing entry; the permission table is only returned on the detail route.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: String,
    pub granted: usize,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        RoleSummary {
            id: role.id,
            name: role.name.clone(),
            granted: role.permissions.iter_granted().count(),
        }
    }
}
