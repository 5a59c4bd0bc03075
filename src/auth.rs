use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::driver::{Driver, DriverRole, Session},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "medride_session";

#[derive(Debug, Clone)]
pub struct AuthenticatedDriver {
    pub id: String,
    pub username: String,
    pub role: DriverRole,
}

#[derive(Debug, Clone, Default)]
pub struct CurrentDriver(pub Option<AuthenticatedDriver>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentDriver
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The session middleware resolves the cookie and stashes the identity.
        if let Some(driver) = parts.extensions.get::<AuthenticatedDriver>() {
            return Ok(Self(Some(driver.clone())));
        }

        Ok(Self(None))
    }
}

impl CurrentDriver {
    /// The single authorization check at the core boundary: a session must
    /// exist and carry the driver role.
    pub fn require_driver(&self) -> Result<&AuthenticatedDriver, AppError> {
        let driver = self.0.as_ref().ok_or(AppError::Unauthorized)?;
        if driver.role == DriverRole::Driver {
            Ok(driver)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub async fn register_driver(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AuthenticatedDriver, AppError> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(AppError::BadRequest("username and email are required".into()));
    }
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "password must be at least 8 characters".into(),
        ));
    }

    let taken: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM drivers WHERE username = ? OR email = ?")
            .bind(username)
            .bind(email)
            .fetch_one(&state.db)
            .await?;
    if taken > 0 {
        return Err(AppError::BadRequest(
            "username or email is already registered".into(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("hash password: {err}")))?
        .to_string();

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO drivers (id, username, email, password_hash, role, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(DriverRole::Driver.as_str())
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    Ok(AuthenticatedDriver {
        id,
        username: username.to_string(),
        role: DriverRole::Driver,
    })
}

pub async fn authenticate_driver(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> Result<AuthenticatedDriver, AppError> {
    let driver =
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE username = ? OR email = ?")
            .bind(identifier)
            .bind(identifier)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

    let parsed = PasswordHash::new(&driver.password_hash)
        .map_err(|err| AppError::Other(anyhow::anyhow!("stored hash is invalid: {err}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)?;

    sqlx::query("UPDATE drivers SET last_login_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(&driver.id)
        .execute(&state.db)
        .await?;

    // An unrecognized role denies access rather than defaulting to driver.
    let role = DriverRole::parse(&driver.role).ok_or(AppError::Forbidden)?;
    Ok(AuthenticatedDriver {
        id: driver.id,
        username: driver.username,
        role,
    })
}

pub async fn create_session(state: &AppState, driver_id: &str) -> Result<String, AppError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::days(state.config.session_ttl_days);
    sqlx::query(
        "INSERT INTO sessions (id, driver_id, created_at, last_seen_at, expires_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(driver_id)
    .bind(now)
    .bind(now)
    .bind(expires_at)
    .execute(&state.db)
    .await?;
    Ok(id)
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    jar.remove(cookie)
}

/// Resolves the session cookie once per request and stashes the caller's
/// identity in request extensions for the `CurrentDriver` extractor.
pub async fn load_session(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match resolve_session(&state, cookie.value()).await {
            Ok(Some(driver)) => {
                req.extensions_mut().insert(driver);
            }
            Ok(None) => {}
            Err(err) => return err.into_response(),
        }
    }
    next.run(req).await
}

async fn resolve_session(
    state: &AppState,
    session_id: &str,
) -> Result<Option<AuthenticatedDriver>, AppError> {
    let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
        .bind(session_id)
        .fetch_optional(&state.db)
        .await?;

    let session = match session {
        Some(session) => session,
        None => return Ok(None),
    };

    if let Some(expires_at) = session.expires_at {
        if expires_at < Utc::now() {
            destroy_session(state, session_id).await?;
            return Ok(None);
        }
    }

    sqlx::query("UPDATE sessions SET last_seen_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(session_id)
        .execute(&state.db)
        .await?;

    let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = ?")
        .bind(&session.driver_id)
        .fetch_optional(&state.db)
        .await?;

    // A session backed by a row with an unrecognized role resolves to no
    // identity at all.
    Ok(driver.and_then(|driver| {
        DriverRole::parse(&driver.role).map(|role| AuthenticatedDriver {
            id: driver.id,
            username: driver.username,
            role,
        })
    }))
}
