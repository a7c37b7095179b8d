use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::authz::Permissions;
use crate::errors::AppError;
use crate::models::driver::DbDriver;
use crate::models::role::Role;
use crate::models::status::Status;
use crate::models::user::DbUser;

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, AppError> {
    let s = s.trim();

    // Try RFC3339 first (e.g. 2025-11-19T12:34:56Z)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // sqlx encodes DateTime<Utc> as "YYYY-MM-DD HH:MM:SS.f+00:00"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }

    // SQLite CURRENT_TIMESTAMP: "YYYY-MM-DD HH:MM:SS" (with optional fractional seconds)
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(naive_date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let ndt = naive_date.and_hms_opt(0, 0, 0).ok_or_else(|| AppError::internal("invalid datetime: date out of range".to_string()))?;
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(AppError::internal(format!("invalid datetime: {}", s)))
}

fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|e| AppError::internal(format!("invalid uuid: {}", e)))
}

fn get<T>(row: &SqliteRow, column: &str) -> Result<T, AppError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| AppError::internal(format!("missing {}: {}", column, e)))
}

pub fn parse_permissions(raw: &str) -> Result<Permissions, AppError> {
    if raw.trim().is_empty() {
        return Ok(Permissions::none());
    }
    serde_json::from_str(raw).map_err(|e| AppError::internal(format!("invalid permissions: {}", e)))
}

pub fn db_user_from_row(row: &SqliteRow) -> Result<DbUser, AppError> {
    let id_s: String = get(row, "id")?;
    let name: String = get(row, "name")?;
    let email: String = get(row, "email")?;
    let password_hash: String = get(row, "password_hash")?;
    let status_s: String = get(row, "status")?;
    let role_id_s: Option<String> = get(row, "role_id")?;
    let created_at_s: String = get(row, "created_at")?;
    let updated_at_s: String = get(row, "updated_at")?;

    let id = parse_uuid(&id_s)?;
    let status: Status = status_s.parse()?;
    let role_id = role_id_s.as_deref().map(parse_uuid).transpose()?;
    let created_at = parse_datetime(&created_at_s)?;
    let updated_at = parse_datetime(&updated_at_s)?;

    Ok(DbUser { id, name, email, password_hash, status, role_id, created_at, updated_at })
}

pub fn role_from_row(row: &SqliteRow) -> Result<Role, AppError> {
    let id_s: String = get(row, "id")?;
    let name: String = get(row, "name")?;
    let permissions_s: String = get(row, "permissions")?;
    let created_at_s: String = get(row, "created_at")?;
    let updated_at_s: String = get(row, "updated_at")?;

    let id = parse_uuid(&id_s)?;
    let permissions = parse_permissions(&permissions_s)?;
    let created_at = parse_datetime(&created_at_s)?;
    let updated_at = parse_datetime(&updated_at_s)?;

    Ok(Role { id, name, permissions, created_at, updated_at })
}

pub fn db_driver_from_row(row: &SqliteRow) -> Result<DbDriver, AppError> {
    let id_s: String = get(row, "id")?;
    let company_id_s: String = get(row, "company_id")?;
    let name: String = get(row, "name")?;
    let phone: String = get(row, "phone")?;
    let license_number: Option<String> = get(row, "license_number")?;
    let password_hash: String = get(row, "password_hash")?;
    let status_s: String = get(row, "status")?;
    let created_at_s: String = get(row, "created_at")?;
    let updated_at_s: String = get(row, "updated_at")?;

    let id = parse_uuid(&id_s)?;
    let company_id = parse_uuid(&company_id_s)?;
    let status: Status = status_s.parse()?;
    let created_at = parse_datetime(&created_at_s)?;
    let updated_at = parse_datetime(&updated_at_s)?;

    Ok(DbDriver { id, name, phone, license_number, password_hash, status, company_id, created_at, updated_at })
}
