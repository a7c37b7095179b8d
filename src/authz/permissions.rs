use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Business-entity areas that are permissioned independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Module {
    Customers,
    Contracts,
    Orders,
    Vehicles,
    Drivers,
    Locations,
    CreditTerms,
    VehicleTypes,
    Users,
    Roles,
    Company,
}

impl Module {
    pub const ALL: [Module; 11] = [
        Module::Customers,
        Module::Contracts,
        Module::Orders,
        Module::Vehicles,
        Module::Drivers,
        Module::Locations,
        Module::CreditTerms,
        Module::VehicleTypes,
        Module::Users,
        Module::Roles,
        Module::Company,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Module::Customers => "Customers",
            Module::Contracts => "Contracts",
            Module::Orders => "Orders",
            Module::Vehicles => "Vehicles",
            Module::Drivers => "Drivers",
            Module::Locations => "Locations",
            Module::CreditTerms => "CreditTerms",
            Module::VehicleTypes => "VehicleTypes",
            Module::Users => "Users",
            Module::Roles => "Roles",
            Module::Company => "Company",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity at which access to a [`Module`] is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum PermissionKind {
    Read,
    Write,
    Update,
    Delete,
    Export,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 5] = [
        PermissionKind::Read,
        PermissionKind::Write,
        PermissionKind::Update,
        PermissionKind::Delete,
        PermissionKind::Export,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionKind::Read => "Read",
            PermissionKind::Write => "Write",
            PermissionKind::Update => "Update",
            PermissionKind::Delete => "Delete",
            PermissionKind::Export => "Export",
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire/storage shape of a permission table: `{ "Orders": { "Read": true } }`.
///
/// Keys are the enumerated types, so an unknown module or kind fails to
/// deserialize instead of silently reading as `false`.
pub type PermissionMap = BTreeMap<Module, BTreeMap<PermissionKind, bool>>;

const MODULE_COUNT: usize = Module::ALL.len();
const KIND_COUNT: usize = PermissionKind::ALL.len();

/// Module x permission-kind grant table attached to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "PermissionMap")]
pub struct Permissions {
    table: [[bool; KIND_COUNT]; MODULE_COUNT],
}

impl Permissions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            table: [[true; KIND_COUNT]; MODULE_COUNT],
        }
    }

    pub fn get(&self, module: Module, kind: PermissionKind) -> bool {
        self.table[module.index()][kind.index()]
    }

    pub fn grant(&mut self, module: Module, kind: PermissionKind) {
        self.table[module.index()][kind.index()] = true;
    }

    pub fn revoke(&mut self, module: Module, kind: PermissionKind) {
        self.table[module.index()][kind.index()] = false;
    }

    pub fn with(mut self, module: Module, kinds: impl IntoIterator<Item = PermissionKind>) -> Self {
        for kind in kinds {
            self.grant(module, kind);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.iter_granted().next().is_none()
    }

    /// Every `(module, kind)` pair whose flag is set, in declaration order.
    pub fn iter_granted(&self) -> impl Iterator<Item = (Module, PermissionKind)> + '_ {
        Module::ALL.into_iter().flat_map(move |module| {
            PermissionKind::ALL
                .into_iter()
                .filter(move |kind| self.get(module, *kind))
                .map(move |kind| (module, kind))
        })
    }

    pub fn to_map(&self) -> PermissionMap {
        Module::ALL
            .into_iter()
            .map(|module| {
                let kinds = PermissionKind::ALL
                    .into_iter()
                    .map(|kind| (kind, self.get(module, kind)))
                    .collect();
                (module, kinds)
            })
            .collect()
    }
}

impl From<PermissionMap> for Permissions {
    fn from(map: PermissionMap) -> Self {
        let mut permissions = Permissions::none();
        for (module, kinds) in map {
            for (kind, granted) in kinds {
                if granted {
                    permissions.grant(module, kind);
                }
            }
        }
        permissions
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// `true` only when the exact flag is set. A missing table reads as `false`.
pub fn has_permission(permissions: Option<&Permissions>, module: Module, kind: PermissionKind) -> bool {
    permissions.map(|p| p.get(module, kind)).unwrap_or(false)
}

pub fn has_read_permission(permissions: Option<&Permissions>, module: Module) -> bool {
    has_permission(permissions, module, PermissionKind::Read)
}

pub fn has_write_permission(permissions: Option<&Permissions>, module: Module) -> bool {
    has_permission(permissions, module, PermissionKind::Write)
}

pub fn has_update_permission(permissions: Option<&Permissions>, module: Module) -> bool {
    has_permission(permissions, module, PermissionKind::Update)
}

pub fn has_delete_permission(permissions: Option<&Permissions>, module: Module) -> bool {
    has_permission(permissions, module, PermissionKind::Delete)
}

pub fn has_export_permission(permissions: Option<&Permissions>, module: Module) -> bool {
    has_permission(permissions, module, PermissionKind::Export)
}

/// Result of asking a principal for its whole permission table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionListing {
    Granted(Permissions),
    /// No table is attached to the principal. Serializes as `null`.
    NoPermissions,
}

impl PermissionListing {
    pub fn as_permissions(&self) -> Option<&Permissions> {
        match self {
            PermissionListing::Granted(p) => Some(p),
            PermissionListing::NoPermissions => None,
        }
    }
}

impl Serialize for PermissionListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PermissionListing::Granted(p) => p.serialize(serializer),
            PermissionListing::NoPermissions => serializer.serialize_none(),
        }
    }
}

pub fn permission_listing(permissions: Option<&Permissions>) -> PermissionListing {
    match permissions {
        Some(p) => PermissionListing::Granted(*p),
        None => PermissionListing::NoPermissions,
    }
}
