mod common;

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use common::{insert_company, insert_driver, insert_role, insert_user, setup_db};
use fleet_office::authz::{Module, PermissionKind, Permissions, Principal, PrincipalResolver, PrincipalStore};
use fleet_office::db::principals::{fetch_user_by_email, SqlitePrincipalStore};
use fleet_office::jwt::TokenSubject;
use fleet_office::models::status::Status;

#[tokio::test]
async fn store_loads_user_with_role_permissions() -> Result<()> {
    let db = setup_db().await?;
    let perms = Permissions::none()
        .with(Module::CreditTerms, [PermissionKind::Read, PermissionKind::Export])
        .with(Module::Company, [PermissionKind::Update]);
    let role_id = insert_role(&db.pool, "Accounts", &perms).await?;
    let user_id = insert_user(&db.pool, "accounts@example.com", Status::Active, Some(role_id)).await?;

    let store = SqlitePrincipalStore::new(db.pool.clone());
    let record = store.find_user_with_role(user_id).await?.expect("user exists");

    assert_eq!(record.user.id, user_id);
    assert_eq!(record.user.status, Status::Active);
    let role = record.role.expect("role attached");
    assert_eq!(role.id, role_id);
    assert_eq!(role.permissions, perms);

    Ok(())
}

#[tokio::test]
async fn store_returns_none_for_unknown_ids() -> Result<()> {
    let db = setup_db().await?;
    let store = SqlitePrincipalStore::new(db.pool.clone());

    assert!(store.find_user_with_role(Uuid::new_v4()).await?.is_none());
    assert!(store.find_driver(Uuid::new_v4()).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn email_lookup_ignores_case() -> Result<()> {
    let db = setup_db().await?;
    let user_id = insert_user(&db.pool, "Mixed.Case@example.com", Status::Active, None).await?;

    let found = fetch_user_by_email(&db.pool, "mixed.case@EXAMPLE.com").await?.expect("user found");
    assert_eq!(found.id, user_id);

    Ok(())
}

#[tokio::test]
async fn emails_differing_only_in_case_cannot_coexist() -> Result<()> {
    let db = setup_db().await?;
    let first = insert_user(&db.pool, "Ann@example.com", Status::Active, None).await?;

    let second = insert_user(&db.pool, "ann@example.com", Status::Active, None).await;
    assert!(second.is_err(), "a second account with the same email in another case was stored");

    let found = fetch_user_by_email(&db.pool, "ann@example.com").await?.expect("user found");
    assert_eq!(found.id, first);

    Ok(())
}

#[tokio::test]
async fn resolver_over_sqlite_strips_credentials_and_scopes_drivers() -> Result<()> {
    let db = setup_db().await?;
    let role_id = insert_role(&db.pool, "Administrator", &Permissions::all()).await?;
    let user_id = insert_user(&db.pool, "admin@example.com", Status::Active, Some(role_id)).await?;
    let company_id = insert_company(&db.pool, "Acme Haulage").await?;
    let driver_id = insert_driver(&db.pool, company_id, "+15550100", Status::Active).await?;

    let resolver = PrincipalResolver::new(Arc::new(SqlitePrincipalStore::new(db.pool.clone())));

    let user = resolver.resolve(TokenSubject::User(user_id)).await?;
    assert!(matches!(user, Principal::User(_)));
    assert!(user.can(Module::Drivers, PermissionKind::Delete));
    assert!(!serde_json::to_string(&user)?.contains("argon2"));

    let driver = resolver.resolve(TokenSubject::Driver(driver_id)).await?;
    let resolved = driver.as_driver().expect("driver principal");
    assert_eq!(resolved.company_id, company_id);
    assert!(!driver.can(Module::Orders, PermissionKind::Read));
    assert!(!serde_json::to_string(&driver)?.contains("argon2"));

    Ok(())
}

#[tokio::test]
async fn corrupt_permission_json_surfaces_as_error() -> Result<()> {
    let db = setup_db().await?;
    let role_id = insert_role(&db.pool, "Broken", &Permissions::none()).await?;
    sqlx::query("UPDATE roles SET permissions = ? WHERE id = ?")
        .bind(r#"{"Invoices":{"Read":true}}"#)
        .bind(role_id.to_string())
        .execute(&db.pool)
        .await?;
    let user_id = insert_user(&db.pool, "broken@example.com", Status::Active, Some(role_id)).await?;

    let store = SqlitePrincipalStore::new(db.pool.clone());
    assert!(store.find_user_with_role(user_id).await.is_err());

    Ok(())
}
