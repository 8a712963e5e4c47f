use crate::{
    AppState,
    auth::{ADMIN_ROLE, LOGIN_PATH, SESSION_COOKIE, Session},
    config::Env,
    error::{ApiError, ErrorBody, RepoError},
    models::{
        CreateJobOpeningRequest, CreateStatRequest, CreateTeamMemberRequest,
        CreateTestimonialRequest, JobOpening, LoginRequest, LoginResponse, Resource,
        Stat, SuccessResponse, TeamMember, Testimonial, UpdateJobOpeningRequest,
        UpdateStatRequest, UpdateTeamMemberRequest, UpdateTestimonialRequest,
    },
    repository::{Repository, RepositoryState, ResourceStore},
};
use axum::{
    Form, Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{FormRejection, JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::Value;
use subtle::ConstantTimeEq;
use uuid::Uuid;

// --- Query Structs ---

/// IdQuery
///
/// The `?id=` query parameter accepted by DELETE.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// Identifier of the record to delete.
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

// --- Generic Resource Handlers ---

/// require_id
///
/// Missing or blank identifiers are a client error. An identifier that is present but not
/// a UUID cannot match any row, so it fails the same way a lookup of an unknown id does.
fn require_id<R: Resource>(raw: Option<&str>, action: &str) -> Result<Uuid, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingIdentifier)?;
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::internal(
            format!("Failed to {} {}", action, R::SINGULAR),
            RepoError::MalformedId(raw.to_string()),
        )
    })
}

/// list_records
///
/// Every record of `R`, ordered by `order` ascending. An empty table yields `[]`.
pub async fn list_records<R>(
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<R>>, ApiError>
where
    R: Resource,
    dyn Repository: ResourceStore<R>,
{
    ResourceStore::<R>::list(&*repo)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(format!("Failed to fetch {}", R::PLURAL), e))
}

/// list_visible
///
/// The public view of `R`: same ordering as `list_records`, inactive records removed.
pub async fn list_visible<R>(
    State(repo): State<RepositoryState>,
) -> Result<Json<Vec<R>>, ApiError>
where
    R: Resource,
    dyn Repository: ResourceStore<R>,
{
    let records = ResourceStore::<R>::list(&*repo)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to fetch {}", R::PLURAL), e))?;
    Ok(Json(
        records
            .into_iter()
            .filter(|record| record.is_visible())
            .collect(),
    ))
}

/// create_record
///
/// Inserts a new record with a server-generated id. Unparseable bodies are treated like
/// any other failure of the operation: only identifier presence is validated here.
pub async fn create_record<R>(
    State(repo): State<RepositoryState>,
    payload: Result<Json<R::Create>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: Resource,
    dyn Repository: ResourceStore<R>,
{
    let failure = || format!("Failed to create {}", R::SINGULAR);
    let Json(input) = payload.map_err(|e| ApiError::internal(failure(), e))?;

    let record = ResourceStore::<R>::create(&*repo, input)
        .await
        .map_err(|e| ApiError::internal(failure(), e))?;

    tracing::info!(id = %record.id(), "created {}", R::SINGULAR);
    Ok((StatusCode::CREATED, Json(record)))
}

/// update_record
///
/// Overwrites the fields present in the body of the record named by its `id`. The id is
/// read from the raw JSON before the body is parsed into the typed patch, so a body
/// without one is a client error whatever its other fields hold.
pub async fn update_record<R>(
    State(repo): State<RepositoryState>,
    body: Bytes,
) -> Result<Json<R>, ApiError>
where
    R: Resource,
    dyn Repository: ResourceStore<R>,
{
    let failure = || format!("Failed to update {}", R::SINGULAR);
    let value: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::internal(failure(), e))?;
    let id = require_id::<R>(body_id(&value).as_deref(), "update")?;
    let patch: R::Patch =
        serde_json::from_value(value).map_err(|e| ApiError::internal(failure(), e))?;

    let record = ResourceStore::<R>::update(&*repo, id, patch)
        .await
        .map_err(|e| ApiError::internal(failure(), e))?;

    tracing::info!(%id, "updated {}", R::SINGULAR);
    Ok(Json(record))
}

/// The `id` member of an update body. Non-string ids are kept in their JSON form so they
/// fail as malformed rather than as missing.
fn body_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

/// delete_record
///
/// Removes the record named by `?id=`. Deleting an unknown id is a persistence failure
/// (500), not a not-found response.
pub async fn delete_record<R>(
    State(repo): State<RepositoryState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError>
where
    R: Resource,
    dyn Repository: ResourceStore<R>,
{
    let raw = query.ok().and_then(|Query(query)| query.id);
    let id = require_id::<R>(raw.as_deref(), "delete")?;

    ResourceStore::<R>::delete(&*repo, id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to delete {}", R::SINGULAR), e))?;

    tracing::info!(%id, "deleted {}", R::SINGULAR);
    Ok(Json(SuccessResponse { success: true }))
}

// --- Documented Per-Resource Endpoints ---

/// resource_endpoints
///
/// Mounts the generic handlers for one resource under a module of concrete functions, so
/// each gets its own OpenAPI entry.
macro_rules! resource_endpoints {
    (
        $module:ident,
        $resource:ident,
        $create:ident,
        $patch:ident,
        admin = $admin_path:tt,
        public = $public_path:tt,
        tag = $tag:tt
    ) => {
        pub mod $module {
            use super::*;

            /// [Public] Every record, including inactive ones, ordered by `order`.
            #[utoipa::path(
                get,
                path = $admin_path,
                tag = $tag,
                responses(
                    (status = 200, description = "All records", body = [$resource]),
                    (status = 500, description = "Persistence failure", body = ErrorBody)
                )
            )]
            pub async fn list(
                repo: State<RepositoryState>,
            ) -> Result<Json<Vec<$resource>>, ApiError> {
                list_records::<$resource>(repo).await
            }

            /// [Public] Records shown to site visitors, ordered by `order`.
            #[utoipa::path(
                get,
                path = $public_path,
                tag = $tag,
                responses(
                    (status = 200, description = "Visible records", body = [$resource]),
                    (status = 500, description = "Persistence failure", body = ErrorBody)
                )
            )]
            pub async fn visible(
                repo: State<RepositoryState>,
            ) -> Result<Json<Vec<$resource>>, ApiError> {
                list_visible::<$resource>(repo).await
            }

            /// [Admin] Creates a record; omitted optional fields get their defaults.
            #[utoipa::path(
                post,
                path = $admin_path,
                tag = $tag,
                request_body = $create,
                responses(
                    (status = 201, description = "Created", body = $resource),
                    (status = 401, description = "No admin session", body = ErrorBody),
                    (status = 500, description = "Persistence failure", body = ErrorBody)
                )
            )]
            pub async fn create(
                repo: State<RepositoryState>,
                payload: Result<Json<$create>, JsonRejection>,
            ) -> Result<(StatusCode, Json<$resource>), ApiError> {
                create_record::<$resource>(repo, payload).await
            }

            /// [Admin] Overwrites the provided fields of the record named by `id`.
            #[utoipa::path(
                put,
                path = $admin_path,
                tag = $tag,
                request_body = $patch,
                responses(
                    (status = 200, description = "Updated", body = $resource),
                    (status = 400, description = "Missing id", body = ErrorBody),
                    (status = 401, description = "No admin session", body = ErrorBody),
                    (status = 500, description = "Persistence failure", body = ErrorBody)
                )
            )]
            pub async fn update(
                repo: State<RepositoryState>,
                body: Bytes,
            ) -> Result<Json<$resource>, ApiError> {
                update_record::<$resource>(repo, body).await
            }

            /// [Admin] Deletes the record named by `?id=`.
            #[utoipa::path(
                delete,
                path = $admin_path,
                tag = $tag,
                params(IdQuery),
                responses(
                    (status = 200, description = "Deleted", body = SuccessResponse),
                    (status = 400, description = "Missing id", body = ErrorBody),
                    (status = 401, description = "No admin session", body = ErrorBody),
                    (status = 500, description = "Persistence failure", body = ErrorBody)
                )
            )]
            pub async fn delete(
                repo: State<RepositoryState>,
                query: Result<Query<IdQuery>, QueryRejection>,
            ) -> Result<Json<SuccessResponse>, ApiError> {
                delete_record::<$resource>(repo, query).await
            }
        }
    };
}

resource_endpoints!(
    team,
    TeamMember,
    CreateTeamMemberRequest,
    UpdateTeamMemberRequest,
    admin = "/api/admin/team",
    public = "/api/team",
    tag = "team"
);

resource_endpoints!(
    stats,
    Stat,
    CreateStatRequest,
    UpdateStatRequest,
    admin = "/api/admin/stats",
    public = "/api/stats",
    tag = "stats"
);

resource_endpoints!(
    testimonials,
    Testimonial,
    CreateTestimonialRequest,
    UpdateTestimonialRequest,
    admin = "/api/admin/testimonials",
    public = "/api/testimonials",
    tag = "testimonials"
);

resource_endpoints!(
    careers,
    JobOpening,
    CreateJobOpeningRequest,
    UpdateJobOpeningRequest,
    admin = "/api/admin/careers",
    public = "/api/careers",
    tag = "careers"
);

// --- Sessions ---

/// The `HttpOnly` cookie carrying a freshly issued session token. It lives for the browser
/// session; the token's own `exp` bounds how long it is honoured.
fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.config.env == Env::Production)
        .build()
}

/// An expired, empty `session` cookie. Added rather than removed from the jar so that the
/// `Set-Cookie` is sent even when the request carried no session.
fn cleared_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE).path("/").build();
    cookie.make_removal();
    cookie
}

/// issue_admin_session
///
/// Checks the credentials against the configured admin account and signs a token carrying
/// the admin role.
fn issue_admin_session(state: &AppState, credentials: &LoginRequest) -> Result<String, ApiError> {
    let config = &state.config;
    let email_matches = credentials.email.trim() == config.admin_email;
    let password_matches: bool = credentials
        .password
        .as_bytes()
        .ct_eq(config.admin_password.as_bytes())
        .into();
    if !(email_matches && password_matches) {
        tracing::warn!(email = %credentials.email, "rejected admin login");
        return Err(ApiError::Unauthorized);
    }
    let token = state.sessions.issue(&config.admin_email, ADMIN_ROLE)?;
    tracing::info!(email = %config.admin_email, "admin signed in");
    Ok(token)
}

/// login
///
/// [Public Route] Exchanges the admin credentials for a session token. The token is
/// returned in the body and also set as an `HttpOnly` cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Wrong credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(credentials) = payload.map_err(|_| ApiError::Unauthorized)?;
    let token = issue_admin_session(&state, &credentials)?;
    let jar = jar.add(session_cookie(&state, token.clone()));
    Ok((jar, Json(LoginResponse { token })))
}

/// logout
///
/// [Public Route] Clears the session cookie. Bearer tokens simply expire.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Signed out", body = SuccessResponse))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    (
        jar.add(cleared_session_cookie()),
        Json(SuccessResponse { success: true }),
    )
}

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin Login</title></head>
<body>
<main>
<h1>Admin Login</h1>
{error}
<form method="post" action="/admin/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form>
</main>
</body>
</html>
"#;

/// login_page
///
/// [Public Route] The admin sign-in form.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let error = if query.error.is_some() {
        r#"<p role="alert">Invalid email or password</p>"#
    } else {
        ""
    };
    Html(LOGIN_PAGE.replace("{error}", error))
}

/// login_form
///
/// [Public Route] Form submission of the sign-in page. Redirects to the dashboard with the
/// session cookie set, or back to the form on failure.
pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Form<LoginRequest>, FormRejection>,
) -> Response {
    let retry = format!("{}?error=1", LOGIN_PATH);
    let Ok(Form(credentials)) = payload else {
        return Redirect::to(&retry).into_response();
    };
    match issue_admin_session(&state, &credentials) {
        Ok(token) => (
            jar.add(session_cookie(&state, token)),
            Redirect::to("/admin/dashboard"),
        )
            .into_response(),
        Err(_) => Redirect::to(&retry).into_response(),
    }
}

// --- Admin UI ---

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// dashboard
///
/// [Admin UI] Entry point of the content admin: one row per managed resource with its
/// record count and the API path that manages it.
pub async fn dashboard(
    session: Session,
    State(repo): State<RepositoryState>,
) -> Result<Html<String>, ApiError> {
    let failure = |e: RepoError| ApiError::internal("Failed to load dashboard", e);
    let team = ResourceStore::<TeamMember>::list(&*repo).await.map_err(failure)?;
    let stats = ResourceStore::<Stat>::list(&*repo).await.map_err(failure)?;
    let testimonials = ResourceStore::<Testimonial>::list(&*repo)
        .await
        .map_err(failure)?;
    let careers = ResourceStore::<JobOpening>::list(&*repo)
        .await
        .map_err(failure)?;

    let sections = [
        ("Statistics", stats.len(), "/api/admin/stats"),
        ("Team Members", team.len(), "/api/admin/team"),
        ("Testimonials", testimonials.len(), "/api/admin/testimonials"),
        ("Career Openings", careers.len(), "/api/admin/careers"),
    ];
    let rows: String = sections
        .iter()
        .map(|(title, count, path)| {
            format!("<li><strong>{title}</strong>: {count} <code>{path}</code></li>\n")
        })
        .collect();

    Ok(Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Admin Dashboard</title></head>\n<body>\n<h1>Admin Dashboard</h1>\n<p>Signed in as {}</p>\n<ul>\n{}</ul>\n</body>\n</html>\n",
        escape_html(&session.subject),
        rows
    )))
}
