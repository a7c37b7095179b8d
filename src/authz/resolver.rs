use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::jwt::TokenSubject;
use crate::models::driver::{AuthenticatedDriver, DbDriver, Driver};
use crate::models::user::{User, UserWithRole};

use super::principal::Principal;

/// Read access to the principal records needed for authentication.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Load a user together with its role and the role's permission table.
    async fn find_user_with_role(&self, user_id: Uuid) -> AppResult<Option<UserWithRole>>;

    async fn find_driver(&self, driver_id: Uuid) -> AppResult<Option<DbDriver>>;
}

/// Turns a verified token subject into an active [`Principal`].
#[derive(Clone)]
pub struct PrincipalResolver {
    store: Arc<dyn PrincipalStore>,
}

impl PrincipalResolver {
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, subject: TokenSubject) -> AppResult<Principal> {
        match subject {
            TokenSubject::Driver(driver_id) => self.resolve_driver(driver_id).await,
            TokenSubject::User(user_id) => self.resolve_user(user_id).await,
        }
    }

    async fn resolve_driver(&self, driver_id: Uuid) -> AppResult<Principal> {
        let driver = match self.store.find_driver(driver_id).await? {
            Some(driver) if driver.status.is_active() => driver,
            other => {
                tracing::debug!(
                    driver_id = %driver_id,
                    status = ?other.map(|d| d.status),
                    "driver rejected"
                );
                return Err(AppError::authentication_rejected("driver not found or inactive"));
            }
        };

        let driver: Driver = driver.into();
        Ok(Principal::Driver(AuthenticatedDriver::from(driver)))
    }

    async fn resolve_user(&self, user_id: Uuid) -> AppResult<Principal> {
        let record = match self.store.find_user_with_role(user_id).await? {
            Some(record) if record.user.status.is_active() => record,
            other => {
                tracing::debug!(
                    user_id = %user_id,
                    status = ?other.map(|r| r.user.status),
                    "user rejected"
                );
                return Err(AppError::authentication_rejected("user not found or inactive"));
            }
        };

        Ok(Principal::User(User::from(record)))
    }
}
