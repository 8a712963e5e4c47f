use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The content listings here return only the
/// records visitors may see (`active` ones), so the marketing pages never have to filter.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/{resource}
        // Visible records, ordered by `order`.
        .route("/api/team", get(handlers::team::visible))
        .route("/api/stats", get(handlers::stats::visible))
        .route("/api/testimonials", get(handlers::testimonials::visible))
        .route("/api/careers", get(handlers::careers::visible))
        // POST /api/auth/login, /api/auth/logout
        // Session issuance for the admin account.
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        // GET/POST /admin/login
        // The sign-in page is the one admin UI route outside the gate.
        .route(
            "/admin/login",
            get(handlers::login_page).post(handlers::login_form),
        )
}
