use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Module, PermissionKind, Principal};
use crate::errors::{AppError, AppResult};
use crate::models::driver::AuthenticatedDriver;
use crate::models::user::User;

/// Value of the `type` claim on driver tokens.
pub const DRIVER_TOKEN_TYPE: &str = "driver";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Arc<Vec<u8>>,
    pub exp_hours: i64,
    pub driver_exp_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            exp_hours: 24,
            driver_exp_hours: 24 * 7,
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| AppError::configuration("JWT_SECRET not set"))?;
        let exp_hours = hours_from_env("JWT_EXP_HOURS", 24)?;
        let driver_exp_hours = hours_from_env("DRIVER_JWT_EXP_HOURS", 24 * 7)?;

        Ok(Self {
            secret: Arc::new(secret.into_bytes()),
            exp_hours,
            driver_exp_hours,
        })
    }

    pub fn encode_user(&self, user_id: Uuid) -> Result<String, AppError> {
        let (iat, exp) = issue_window(self.exp_hours);
        let claims = Claims {
            sub: Some(user_id.to_string()),
            driver_id: None,
            token_type: None,
            company_id: None,
            exp,
            iat,
        };
        self.sign(&claims)
    }

    pub fn encode_driver(&self, driver_id: Uuid, company_id: Uuid) -> Result<String, AppError> {
        let (iat, exp) = issue_window(self.driver_exp_hours);
        let claims = Claims {
            sub: Some(driver_id.to_string()),
            driver_id: Some(driver_id.to_string()),
            token_type: Some(DRIVER_TOKEN_TYPE.to_string()),
            company_id: Some(company_id.to_string()),
            exp,
            iat,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|err| AppError::token(err.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|err| AppError::token(err.to_string()))
    }
}

/// Upper bound on token lifetime, ten years.
const MAX_EXP_HOURS: i64 = 24 * 365 * 10;

fn hours_from_env(key: &str, default: i64) -> Result<i64, AppError> {
    parse_hours(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_hours(key: &str, raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    let hours = match raw {
        Some(val) => val
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::configuration(format!("{} must be a valid integer", key)))?,
        None => default,
    };

    if !(1..=MAX_EXP_HOURS).contains(&hours) {
        return Err(AppError::configuration(format!(
            "{} must be between 1 and {}",
            key, MAX_EXP_HOURS
        )));
    }
    Ok(hours)
}

fn issue_window(hours: i64) -> (usize, usize) {
    use chrono::{Duration, Utc};

    let now = Utc::now();
    let exp = now + Duration::hours(hours);
    (now.timestamp() as usize, exp.timestamp() as usize)
}

/// Raw token payload. Field names follow the token format shared with the
/// frontend and the driver app.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "driverId", default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(rename = "companyId", default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Who a verified token speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSubject {
    User(Uuid),
    Driver(Uuid),
}

impl Claims {
    /// Classify the payload. Anything that is not clearly a user or a driver
    /// token is rejected rather than guessed at.
    pub fn subject(&self) -> Result<TokenSubject, AppError> {
        match self.token_type.as_deref() {
            Some(DRIVER_TOKEN_TYPE) => {
                let raw = self
                    .driver_id
                    .as_deref()
                    .or(self.sub.as_deref())
                    .ok_or_else(|| AppError::token("driver token has no driverId"))?;
                Ok(TokenSubject::Driver(parse_subject_id(raw)?))
            }
            None => {
                let raw = self
                    .sub
                    .as_deref()
                    .ok_or_else(|| AppError::token("token has no subject"))?;
                Ok(TokenSubject::User(parse_subject_id(raw)?))
            }
            Some(other) => Err(AppError::token(format!("unsupported token type: {}", other))),
        }
    }
}

fn parse_subject_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::token("token subject is not a valid id"))
}

/// Extractor for routes that need an authenticated caller. The resolved
/// principal is cached in the request extensions.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

impl AuthPrincipal {
    /// 403 unless the principal holds `kind` on `module`.
    pub fn require(&self, module: Module, kind: PermissionKind) -> AppResult<()> {
        if self.0.can(module, kind) {
            return Ok(());
        }

        tracing::info!(
            principal = %self.0.id(),
            kind = self.0.kind(),
            module = %module,
            permission = %kind,
            "permission denied"
        );
        Err(AppError::forbidden(format!("missing {} permission on {}", kind, module)))
    }

    pub fn require_user(&self) -> AppResult<&User> {
        self.0
            .as_user()
            .ok_or_else(|| AppError::forbidden("this action requires a user account"))
    }

    pub fn require_driver(&self) -> AppResult<&AuthenticatedDriver> {
        self.0
            .as_driver()
            .ok_or_else(|| AppError::forbidden("this action requires a driver account"))
    }

    pub fn into_inner(self) -> Principal {
        self.0
    }
}

impl Deref for AuthPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(AuthPrincipal(principal.clone()));
        }

        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Authorization header missing"))?;

        let claims = state.jwt.decode(token)?;
        let subject = claims.subject()?;
        let principal = state.resolver.resolve(subject).await?;

        parts.extensions.insert(principal.clone());
        Ok(AuthPrincipal(principal))
    }
}
