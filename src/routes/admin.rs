use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin API Router Module
///
/// One route per managed resource, each answering list/create/update/delete.
///
/// Access Control:
/// `create_router` wraps this whole router in `auth::admin_api_gate`. GETs on the public
/// read allow-list pass through for anonymous visitors; every mutation requires a session
/// whose role claim is "admin" and is rejected with 401 before any handler runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/team",
            get(handlers::team::list)
                .post(handlers::team::create)
                .put(handlers::team::update)
                .delete(handlers::team::delete),
        )
        .route(
            "/api/admin/stats",
            get(handlers::stats::list)
                .post(handlers::stats::create)
                .put(handlers::stats::update)
                .delete(handlers::stats::delete),
        )
        .route(
            "/api/admin/testimonials",
            get(handlers::testimonials::list)
                .post(handlers::testimonials::create)
                .put(handlers::testimonials::update)
                .delete(handlers::testimonials::delete),
        )
        // Job openings are served under the "careers" name used by the careers page.
        .route(
            "/api/admin/careers",
            get(handlers::careers::list)
                .post(handlers::careers::create)
                .put(handlers::careers::update)
                .delete(handlers::careers::delete),
        )
}
