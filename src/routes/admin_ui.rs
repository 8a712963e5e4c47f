use crate::{AppState, handlers};
use axum::{Router, response::Redirect, routing::get};

/// Admin UI Router Module
///
/// Pages for the content admin. `create_router` wraps this router in
/// `auth::admin_ui_gate`, which redirects visitors without an admin session to the login
/// page.
pub fn admin_ui_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(|| async { Redirect::to("/admin/dashboard") }))
        .route("/admin/dashboard", get(handlers::dashboard))
}
