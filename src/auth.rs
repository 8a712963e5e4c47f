use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{AppState, config::DEFAULT_PUBLIC_READ_PREFIXES, error::ApiError};

/// The only role with write access to site content.
pub const ADMIN_ROLE: &str = "admin";
/// Name of the cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session";
/// Path of the admin login page; the one admin UI route open to anonymous visitors.
pub const LOGIN_PATH: &str = "/admin/login";
/// Prefix shared by every admin UI route.
pub const ADMIN_UI_PREFIX: &str = "/admin";

/// Claims
///
/// The payload signed into every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account the session was issued to (the admin email).
    pub sub: String,
    /// The role claim checked by the authorization gate.
    pub role: String,
    /// Expiration time, seconds since the epoch. Always validated.
    pub exp: usize,
    /// Issued at, seconds since the epoch.
    pub iat: usize,
}

/// Session
///
/// The verified identity of one request. The gate resolves it once per request and
/// stores it in the request extensions, so handlers read it as explicit request-scoped
/// context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub role: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// SessionAuthority
///
/// Issues and verifies session tokens. The gate treats `verify` as a black box: it either
/// yields a session carrying a role or yields nothing.
pub trait SessionAuthority: Send + Sync {
    fn issue(&self, subject: &str, role: &str) -> Result<String, ApiError>;
    fn verify(&self, token: &str) -> Option<Session>;
}

/// SessionState
///
/// The concrete type used to share the session authority across the application state.
pub type SessionState = Arc<dyn SessionAuthority>;

/// JwtSessions
///
/// HS256 JSON Web Tokens signed with the configured secret.
pub struct JwtSessions {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl JwtSessions {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

impl SessionAuthority for JwtSessions {
    fn issue(&self, subject: &str, role: &str) -> Result<String, ApiError> {
        let now = unix_now();
        let exp = now
            .checked_add(self.ttl_secs)
            .and_then(|exp| usize::try_from(exp).ok())
            .ok_or_else(|| {
                ApiError::internal(
                    "Failed to issue session",
                    format!("session lifetime of {}s is out of range", self.ttl_secs),
                )
            })?;
        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            exp,
            iat: usize::try_from(now).unwrap_or_default(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal("Failed to issue session", e))
    }

    fn verify(&self, token: &str) -> Option<Session> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(Session {
                subject: data.claims.sub,
                role: data.claims.role,
            }),
            Err(e) => {
                // Expired, badly signed or malformed: all of them mean "no session".
                tracing::debug!(error = %e, "rejected session token");
                None
            }
        }
    }
}

/// session_token
///
/// Finds the session token on a request: an `Authorization: Bearer` header wins over the
/// `session` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Access
///
/// What a request needs in order to reach its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    AdminOnly,
}

/// AccessPolicy
///
/// The public read allow-list. A GET whose path falls under one of the prefixes may be
/// served without a session; everything else under the admin prefixes needs the admin
/// role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    public_read_prefixes: Vec<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_PUBLIC_READ_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        )
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl AccessPolicy {
    pub fn new(public_read_prefixes: Vec<String>) -> Self {
        Self {
            public_read_prefixes,
        }
    }

    pub fn public_read_prefixes(&self) -> &[String] {
        &self.public_read_prefixes
    }

    /// Access required by a request to the admin API.
    pub fn api_access(&self, method: &Method, path: &str) -> Access {
        let allow_listed = self
            .public_read_prefixes
            .iter()
            .any(|prefix| under_prefix(path, prefix));
        if *method == Method::GET && allow_listed {
            Access::Public
        } else {
            Access::AdminOnly
        }
    }

    /// Access required by a request to the admin UI. Only the login page is open.
    pub fn ui_access(&self, path: &str) -> Access {
        if under_prefix(path, LOGIN_PATH) || !under_prefix(path, ADMIN_UI_PREFIX) {
            Access::Public
        } else {
            Access::AdminOnly
        }
    }
}

fn resolve_session(state: &AppState, request: &mut Request) -> Option<Session> {
    let session = session_token(request.headers()).and_then(|token| state.sessions.verify(&token));
    if let Some(session) = &session {
        request.extensions_mut().insert(session.clone());
    }
    session
}

/// admin_api_gate
///
/// Middleware over every `/api/admin` route. Allow-listed GETs pass through; any other
/// request without an admin session is answered with 401 before the handler (and the
/// persistence layer) is reached.
pub async fn admin_api_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = resolve_session(&state, &mut request);
    let access = state
        .config
        .access
        .api_access(request.method(), request.uri().path());

    if access == Access::AdminOnly && !session.as_ref().is_some_and(Session::is_admin) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected admin API request without admin session"
        );
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// admin_ui_gate
///
/// Middleware over the admin UI pages. Visitors without an admin session are sent to the
/// login page instead of receiving an error.
pub async fn admin_ui_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = resolve_session(&state, &mut request);
    let access = state.config.access.ui_access(request.uri().path());

    if access == Access::AdminOnly && !session.as_ref().is_some_and(Session::is_admin) {
        return Redirect::to(LOGIN_PATH).into_response();
    }

    next.run(request).await
}

/// Session Extractor Implementation
///
/// Reads the session the gate stored in the request extensions. Handlers behind a gate
/// can take `Session` as an argument; a request without one is rejected with 401.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}
