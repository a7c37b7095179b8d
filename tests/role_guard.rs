mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{insert_company, insert_driver, insert_role, insert_user, send, setup_app, PASSWORD, TEST_SECRET};
use fleet_office::authz::{Module, PermissionKind, Permissions};
use fleet_office::jwt::JwtConfig;
use fleet_office::models::status::Status;

async fn login(app: &axum::Router, email: &str) -> Result<String> {
    let (status, body) = send(app, "POST", "/auth/login", None, Some(json!({ "email": email, "password": PASSWORD }))).await?;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    Ok(body.get("token").and_then(Value::as_str).context("missing token")?.to_string())
}

#[tokio::test]
async fn roles_read_permission_opens_role_endpoints() -> Result<()> {
    let (db, app) = setup_app().await?;
    let admin_role = insert_role(&db.pool, "Administrator", &Permissions::all()).await?;
    let orders_only = Permissions::none().with(Module::Orders, [PermissionKind::Read, PermissionKind::Write]);
    let dispatcher_role = insert_role(&db.pool, "Dispatcher", &orders_only).await?;
    insert_user(&db.pool, "admin@example.com", Status::Active, Some(admin_role)).await?;

    let token = login(&app, "admin@example.com").await?;

    let (status, list) = send(&app, "GET", "/roles", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .context("roles must be an array")?
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Administrator", "Dispatcher"]);

    let (status, role) = send(&app, "GET", &format!("/roles/{}", dispatcher_role), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["permissions"]["Orders"]["Write"], json!(true));
    assert_eq!(role["permissions"]["Orders"]["Delete"], json!(false));

    let (status, _) = send(&app, "GET", &format!("/roles/{}", uuid::Uuid::new_v4()), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn missing_roles_read_is_forbidden() -> Result<()> {
    let (db, app) = setup_app().await?;
    // Write/Update on Roles without Read still does not grant Read
    let perms = Permissions::none().with(Module::Roles, [PermissionKind::Write, PermissionKind::Update]);
    let role_id = insert_role(&db.pool, "Odd", &perms).await?;
    insert_user(&db.pool, "odd@example.com", Status::Active, Some(role_id)).await?;
    insert_user(&db.pool, "norole@example.com", Status::Active, None).await?;

    for email in ["odd@example.com", "norole@example.com"] {
        let token = login(&app, email).await?;
        let (status, body) = send(&app, "GET", "/roles", Some(&token), None).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} should be forbidden", email);
        assert_eq!(body["error"], json!("forbidden"));
    }

    Ok(())
}

#[tokio::test]
async fn drivers_are_forbidden_from_role_endpoints() -> Result<()> {
    let (db, app) = setup_app().await?;
    let company_id = insert_company(&db.pool, "Acme Haulage").await?;
    let driver_id = insert_driver(&db.pool, company_id, "+15550100", Status::Active).await?;
    let token = JwtConfig::new(TEST_SECRET).encode_driver(driver_id, company_id)?;

    let (status, _) = send(&app, "GET", "/roles", Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn role_endpoints_require_a_token() -> Result<()> {
    let (_db, app) = setup_app().await?;

    let (status, _) = send(&app, "GET", "/roles", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}
