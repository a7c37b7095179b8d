use sqlx::Row;
use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use fleet_office::authz::Permissions;
use fleet_office::models::status::Status;
use fleet_office::utils::{hash_password, utc_now};

#[derive(Parser, Debug)]
#[command(author, version, about = "fleet-office admin tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Create an active user holding a role with every permission
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "Administrator")]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Administrator")]
        role: String,
    },
    /// Create an active driver, creating the company when it does not exist yet
    CreateDriver {
        #[arg(long)]
        company: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        license_number: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Try to load env from CWD; when running in Docker the binary CWD may differ,
    // so fall back to the crate-local `.env` using CARGO_MANIFEST_DIR.
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            migrator.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            print_status(&pool, &migrator).await?;
        }
        Commands::CreateAdmin { email, name, password, role } => {
            let pool = get_pool().await?;
            let user_id = create_admin(&pool, &email, &name, &password, &role).await?;
            println!("Created admin {} ({})", email, user_id);
        }
        Commands::CreateDriver { company, name, phone, password, license_number } => {
            let pool = get_pool().await?;
            let driver_id = create_driver(&pool, &company, &name, &phone, &password, license_number.as_deref()).await?;
            println!("Created driver {} ({})", phone, driver_id);
        }
    }

    Ok(())
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to database")
}

async fn create_admin(pool: &SqlitePool, email: &str, name: &str, password: &str, role_name: &str) -> anyhow::Result<Uuid> {
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("email must not be empty");
    }
    let password_hash = hash_password(password)?;
    let permissions = serde_json::to_string(&Permissions::all())?;
    let now = utc_now();

    let mut tx = pool.begin().await?;

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
        .bind(role_name)
        .fetch_optional(&mut *tx)
        .await?;

    let role_id = match existing {
        Some(id) => {
            sqlx::query("UPDATE roles SET permissions = ?, updated_at = ? WHERE id = ?")
                .bind(&permissions)
                .bind(now)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query("INSERT INTO roles (id, name, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
                .bind(&id)
                .bind(role_name)
                .bind(&permissions)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            id
        }
    };

    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, status, role_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id.to_string())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(Status::Active.as_str())
    .bind(&role_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("failed to create user {}", email))?;

    tx.commit().await?;
    Ok(user_id)
}

async fn create_driver(
    pool: &SqlitePool,
    company: &str,
    name: &str,
    phone: &str,
    password: &str,
    license_number: Option<&str>,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;
    let now = utc_now();

    let mut tx = pool.begin().await?;

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM companies WHERE name = ?")
        .bind(company)
        .fetch_optional(&mut *tx)
        .await?;

    let company_id = match existing {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query("INSERT INTO companies (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
                .bind(&id)
                .bind(company)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            id
        }
    };

    let driver_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO drivers (id, company_id, name, phone, license_number, password_hash, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(driver_id.to_string())
    .bind(&company_id)
    .bind(name)
    .bind(phone)
    .bind(license_number)
    .bind(password_hash)
    .bind(Status::Active.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("failed to create driver {}", phone))?;

    tx.commit().await?;
    Ok(driver_id)
}

async fn print_status(pool: &SqlitePool, migrator: &sqlx::migrate::Migrator) -> anyhow::Result<()> {
    // If the migrations table doesn't exist, nothing is applied yet
    let db_applied: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
            .fetch_optional(pool)
            .await?;
    let applied_versions: HashSet<i64> = if db_applied.is_some() {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter() {
        let version = migration.version;
        let status = if applied_versions.contains(&version) { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, version, name);
    }

    Ok(())
}

async fn get_migrator() -> anyhow::Result<sqlx::migrate::Migrator> {
    // Try local ./migrations first (when running from repo root). If that
    // doesn't exist (common in containers where CWD differs), fall back to
    // the crate-local migrations folder determined by CARGO_MANIFEST_DIR.
    let local = Path::new("./migrations");
    let migrator_path = if local.exists() {
        local.to_path_buf()
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    };

    let migrator_path_display = migrator_path.display().to_string();
    sqlx::migrate::Migrator::new(migrator_path)
        .await
        .with_context(|| format!("failed to load migrations from {}", migrator_path_display))
}
