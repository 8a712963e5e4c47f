use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregated by access level (public, admin API, admin UI).
pub mod routes;
use routes::{admin, admin_ui, public};

// --- Public Re-exports ---

pub use auth::{JwtSessions, SessionState};
pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::team::list, handlers::team::visible, handlers::team::create,
        handlers::team::update, handlers::team::delete,
        handlers::stats::list, handlers::stats::visible, handlers::stats::create,
        handlers::stats::update, handlers::stats::delete,
        handlers::testimonials::list, handlers::testimonials::visible,
        handlers::testimonials::create, handlers::testimonials::update,
        handlers::testimonials::delete,
        handlers::careers::list, handlers::careers::visible, handlers::careers::create,
        handlers::careers::update, handlers::careers::delete,
        handlers::login, handlers::logout
    ),
    components(
        schemas(
            models::TeamMember, models::CreateTeamMemberRequest, models::UpdateTeamMemberRequest,
            models::Stat, models::CreateStatRequest, models::UpdateStatRequest,
            models::Testimonial, models::CreateTestimonialRequest, models::UpdateTestimonialRequest,
            models::JobOpening, models::CreateJobOpeningRequest, models::UpdateJobOpeningRequest,
            models::LoginRequest, models::LoginResponse, models::SuccessResponse,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "team", description = "Leadership profiles"),
        (name = "stats", description = "Headline figures"),
        (name = "testimonials", description = "Client testimonials"),
        (name = "careers", description = "Job openings"),
        (name = "auth", description = "Admin sessions")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of application services. Cloned per request; every field
/// is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for the four managed resources.
    pub repo: RepositoryState,
    /// Issues and verifies admin session tokens.
    pub sessions: SessionState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree. Routers are merged rather than nested so that both gates
/// see full request paths when matching the access policy.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Admin API: mutations need an admin session, allow-listed GETs are open.
        .merge(admin::admin_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_api_gate,
        )))
        // Admin UI: anonymous visitors are redirected to the login page.
        .merge(admin_ui::admin_ui_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_ui_gate,
        )))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
