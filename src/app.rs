use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::PrincipalResolver;
use crate::db::principals::SqlitePrincipalStore;
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{auth, health, roles};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub resolver: Arc<PrincipalResolver>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        let store = SqlitePrincipalStore::new(pool.clone());
        Self {
            pool,
            jwt: Arc::new(jwt),
            resolver: Arc::new(PrincipalResolver::new(Arc::new(store))),
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    Ok(create_app_with_config(pool, jwt_config))
}

pub fn create_app_with_config(pool: SqlitePool, jwt: JwtConfig) -> Router {
    let state = AppState::new(pool, jwt);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/driver/login", post(auth::driver_login))
        .route("/me", get(auth::me))
        .route("/permissions", get(auth::permissions))
        .route("/logout", post(auth::logout));

    let role_routes = Router::new()
        .route("/", get(roles::list_roles))
        .route("/:id", get(roles::get_role));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/roles", role_routes)
        .route("/api/health", get(health::health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
