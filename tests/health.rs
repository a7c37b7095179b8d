mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::{send, setup_app};

#[tokio::test]
async fn health_endpoint_reports_db_ok() -> Result<()> {
    let (_db, app) = setup_app().await?;

    let (status, v) = send(&app, "GET", "/api/health", None, None).await?;
    assert_eq!(status, StatusCode::OK, "health endpoint did not return 200");

    let db_ok = v.get("db_ok").and_then(|b| b.as_bool()).unwrap_or(false);
    assert!(db_ok, "expected db_ok: true, got: {}", v);

    Ok(())
}

#[tokio::test]
async fn health_endpoint_reports_degraded_when_db_is_gone() -> Result<()> {
    let (db, app) = setup_app().await?;
    db.pool.close().await;

    let (status, v) = send(&app, "GET", "/api/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "degraded");
    assert_eq!(v["db_ok"], false);
    assert!(v["db_error"].is_string(), "expected a db_error message, got: {}", v);

    Ok(())
}
