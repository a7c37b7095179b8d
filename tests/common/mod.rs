#![allow(dead_code)]

use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use fleet_office::authz::Permissions;
use fleet_office::models::status::Status;
use fleet_office::utils::hash_password;

pub const TEST_SECRET: &str = "test-secret";
pub const PASSWORD: &str = "password123";

pub struct TestDb {
    // keeps the database file alive for the duration of the test
    _dir: TempDir,
    pub pool: SqlitePool,
}

pub async fn setup_db() -> Result<TestDb> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    // run migrations from crate migrations folder
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
    migrator.run(&pool).await?;

    Ok(TestDb { _dir: dir, pool })
}

pub async fn setup_app() -> Result<(TestDb, Router)> {
    let db = setup_db().await?;
    std::env::set_var("JWT_SECRET", TEST_SECRET);
    let app = fleet_office::create_app(db.pool.clone()).await?;
    Ok((db, app))
}

pub async fn insert_role(pool: &SqlitePool, name: &str, permissions: &Permissions) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO roles (id, name, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(serde_json::to_string(permissions)?)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn insert_user(pool: &SqlitePool, email: &str, status: Status, role_id: Option<Uuid>) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, status, role_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind("Test User")
    .bind(email)
    .bind(hash_password(PASSWORD)?)
    .bind(status.as_str())
    .bind(role_id.map(|r| r.to_string()))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_company(pool: &SqlitePool, name: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO companies (id, name) VALUES (?, ?)")
        .bind(id.to_string())
        .bind(name)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn insert_driver(pool: &SqlitePool, company_id: Uuid, phone: &str, status: Status) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO drivers (id, company_id, name, phone, license_number, password_hash, status) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(company_id.to_string())
    .bind("Test Driver")
    .bind(phone)
    .bind("B-1234")
    .bind(hash_password(PASSWORD)?)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn set_user_status(pool: &SqlitePool, id: Uuid, status: Status) -> Result<()> {
    sqlx::query("UPDATE users SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_driver_status(pool: &SqlitePool, id: Uuid, status: Status) -> Result<()> {
    sqlx::query("UPDATE drivers SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Send a request and return the status plus the JSON body (`Value::Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}
