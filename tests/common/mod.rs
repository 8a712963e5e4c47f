#![allow(dead_code)]

use dpb_site::{
    AppConfig, AppState, InMemoryRepository, JwtSessions, RepositoryState,
    auth::{ADMIN_ROLE, SessionAuthority, SessionState},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// State backed by an empty in-memory repository and the default local config.
pub fn test_state() -> AppState {
    state_with_repo(Arc::new(InMemoryRepository::new()))
}

pub fn state_with_repo(repo: RepositoryState) -> AppState {
    let config = AppConfig::default();
    let sessions: SessionState = Arc::new(JwtSessions::new(
        &config.jwt_secret,
        config.session_ttl_secs,
    ));
    AppState {
        repo,
        sessions,
        config,
    }
}

/// A token for the configured admin account, signed with the config's secret.
pub fn admin_token(state: &AppState) -> String {
    state
        .sessions
        .issue(&state.config.admin_email, ADMIN_ROLE)
        .expect("failed to sign admin token")
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_state()).await
}

pub async fn spawn_app_with(state: AppState) -> TestApp {
    let token = admin_token(&state);
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are asserted on, never followed.
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        client,
        token,
    }
}
