use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::status::Status;

/// Public view of a driver account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub license_number: Option<String>,
    pub status: Status,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DbDriver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub license_number: Option<String>,
    pub password_hash: String,
    pub status: Status,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbDriver> for Driver {
    fn from(value: DbDriver) -> Self {
        Driver {
            id: value.id,
            name: value.name,
            phone: value.phone,
            license_number: value.license_number,
            status: value.status,
            company_id: value.company_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// A resolved driver principal. `driver_id` and `company_id` sit at the top
/// level so route handlers can scope queries without unpacking `driver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedDriver {
    pub driver_id: Uuid,
    pub company_id: Uuid,
    pub driver: Driver,
}

impl From<Driver> for AuthenticatedDriver {
    fn from(driver: Driver) -> Self {
        AuthenticatedDriver {
            driver_id: driver.id,
            company_id: driver.company_id,
            driver,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DriverLoginRequest {
    #[schema(example = "+15550100")]
    pub phone: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DriverAuthResponse {
    pub token: String,
    pub driver: AuthenticatedDriver,
}
