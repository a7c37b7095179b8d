//! SQLite queries for users, drivers and roles.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::PrincipalStore;
use crate::db::row_parsers;
use crate::errors::AppResult;
use crate::models::driver::DbDriver;
use crate::models::role::Role;
use crate::models::user::{DbUser, UserWithRole};

const USER_COLUMNS: &str = "id, name, email, password_hash, status, role_id, created_at, updated_at";
const DRIVER_COLUMNS: &str = "id, company_id, name, phone, license_number, password_hash, status, created_at, updated_at";
const ROLE_COLUMNS: &str = "id, name, permissions, created_at, updated_at";

pub async fn fetch_user_by_id(pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<DbUser>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(user_id.to_string()).fetch_optional(pool).await?;
    row.as_ref().map(row_parsers::db_user_from_row).transpose()
}

pub async fn fetch_user_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<DbUser>> {
    let sql = format!("SELECT {} FROM users WHERE lower(email) = lower(?)", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(email.trim()).fetch_optional(pool).await?;
    row.as_ref().map(row_parsers::db_user_from_row).transpose()
}

pub async fn fetch_driver_by_id(pool: &SqlitePool, driver_id: Uuid) -> AppResult<Option<DbDriver>> {
    let sql = format!("SELECT {} FROM drivers WHERE id = ?", DRIVER_COLUMNS);
    let row = sqlx::query(&sql).bind(driver_id.to_string()).fetch_optional(pool).await?;
    row.as_ref().map(row_parsers::db_driver_from_row).transpose()
}

pub async fn fetch_driver_by_phone(pool: &SqlitePool, phone: &str) -> AppResult<Option<DbDriver>> {
    let sql = format!("SELECT {} FROM drivers WHERE phone = ?", DRIVER_COLUMNS);
    let row = sqlx::query(&sql).bind(phone.trim()).fetch_optional(pool).await?;
    row.as_ref().map(row_parsers::db_driver_from_row).transpose()
}

pub async fn fetch_role_by_id(pool: &SqlitePool, role_id: Uuid) -> AppResult<Option<Role>> {
    let sql = format!("SELECT {} FROM roles WHERE id = ?", ROLE_COLUMNS);
    let row = sqlx::query(&sql).bind(role_id.to_string()).fetch_optional(pool).await?;
    row.as_ref().map(row_parsers::role_from_row).transpose()
}

pub async fn list_roles(pool: &SqlitePool) -> AppResult<Vec<Role>> {
    let sql = format!("SELECT {} FROM roles ORDER BY name", ROLE_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(row_parsers::role_from_row).collect()
}

/// Attach the user's role. A dangling `role_id` loads as "no role".
pub async fn load_role_for(pool: &SqlitePool, user: DbUser) -> AppResult<UserWithRole> {
    let role = match user.role_id {
        Some(role_id) => fetch_role_by_id(pool, role_id).await?,
        None => None,
    };
    Ok(UserWithRole { user, role })
}

/// [`PrincipalStore`] backed by the application database.
#[derive(Debug, Clone)]
pub struct SqlitePrincipalStore {
    pool: SqlitePool,
}

impl SqlitePrincipalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for SqlitePrincipalStore {
    async fn find_user_with_role(&self, user_id: Uuid) -> AppResult<Option<UserWithRole>> {
        match fetch_user_by_id(&self.pool, user_id).await? {
            Some(user) => Ok(Some(load_role_for(&self.pool, user).await?)),
            None => Ok(None),
        }
    }

    async fn find_driver(&self, driver_id: Uuid) -> AppResult<Option<DbDriver>> {
        fetch_driver_by_id(&self.pool, driver_id).await
    }
}
