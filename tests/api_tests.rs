mod common;

use common::{TestApp, spawn_app};
use dpb_site::models::{JobOpening, Stat, TeamMember, Testimonial};
use reqwest::StatusCode;
use serde_json::{Value, json};

const ADMIN_PATHS: [&str; 4] = [
    "/api/admin/team",
    "/api/admin/stats",
    "/api/admin/testimonials",
    "/api/admin/careers",
];

/// A valid create payload for the resource mounted at `path`.
fn sample_payload(path: &str, order: i32) -> Value {
    match path {
        "/api/admin/team" => json!({
            "name": "Ada Lovelace", "role": "CTO", "description": "Engines", "order": order
        }),
        "/api/admin/stats" => json!({ "value": "10+", "label": "Years", "order": order }),
        "/api/admin/testimonials" => json!({
            "name": "Grace", "role": "Lead", "company": "Navy", "content": "Great", "order": order
        }),
        "/api/admin/careers" => json!({
            "title": "Engineer", "department": "Platform", "location": "Remote",
            "description": "Build things", "requirements": "Rust\nSQL", "order": order
        }),
        other => panic!("no sample payload for {}", other),
    }
}

async fn list(app: &TestApp, path: &str) -> Vec<Value> {
    let response = app.client.get(app.url(path)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
    response.json().await.unwrap()
}

async fn create_as_admin(app: &TestApp, path: &str, payload: Value) -> Value {
    let response = app
        .client
        .post(app.url(path))
        .bearer_auth(&app.token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", path);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_empty_tables_list_as_empty_arrays() {
    let app = spawn_app().await;
    for path in ADMIN_PATHS {
        assert!(list(&app, path).await.is_empty(), "{} not empty", path);
    }
    for path in ["/api/team", "/api/stats", "/api/testimonials", "/api/careers"] {
        assert!(list(&app, path).await.is_empty(), "{} not empty", path);
    }
}

#[tokio::test]
async fn test_listings_are_sorted_by_order() {
    let app = spawn_app().await;
    for path in ADMIN_PATHS {
        for order in [3, 1, 2] {
            create_as_admin(&app, path, sample_payload(path, order)).await;
        }
        let orders: Vec<i64> = list(&app, path)
            .await
            .iter()
            .map(|record| record["order"].as_i64().unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2, 3], "{} not sorted", path);
    }
}

#[tokio::test]
async fn test_anonymous_get_is_allowed_on_every_resource() {
    let app = spawn_app().await;
    for path in ADMIN_PATHS {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
    }
}

#[tokio::test]
async fn test_mutations_without_admin_session_are_unauthorized() {
    let app = spawn_app().await;
    for path in ADMIN_PATHS {
        let post = app
            .client
            .post(app.url(path))
            .json(&sample_payload(path, 0))
            .send()
            .await
            .unwrap();
        assert_eq!(post.status(), StatusCode::UNAUTHORIZED, "POST {}", path);
        let body: Value = post.json().await.unwrap();
        assert_eq!(body["error"], "Unauthorized");

        // The gate answers before the body is looked at, even an unparseable one.
        let put = app
            .client
            .put(app.url(path))
            .header("content-type", "application/json")
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), StatusCode::UNAUTHORIZED, "PUT {}", path);

        let delete = app
            .client
            .delete(app.url(&format!("{}?id={}", path, uuid::Uuid::new_v4())))
            .bearer_auth("forged.token.value")
            .send()
            .await
            .unwrap();
        assert_eq!(delete.status(), StatusCode::UNAUTHORIZED, "DELETE {}", path);

        assert!(list(&app, path).await.is_empty(), "{} was mutated", path);
    }
}

#[tokio::test]
async fn test_update_and_delete_without_id_are_bad_requests() {
    let app = spawn_app().await;
    for path in ADMIN_PATHS {
        let put = app
            .client
            .put(app.url(path))
            .bearer_auth(&app.token)
            .json(&json!({ "order": 4 }))
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), StatusCode::BAD_REQUEST, "PUT {}", path);
        let body: Value = put.json().await.unwrap();
        assert_eq!(body["error"], "ID is required");

        let delete = app
            .client
            .delete(app.url(path))
            .bearer_auth(&app.token)
            .send()
            .await
            .unwrap();
        assert_eq!(delete.status(), StatusCode::BAD_REQUEST, "DELETE {}", path);

        let empty_id = app
            .client
            .delete(app.url(&format!("{}?id=", path)))
            .bearer_auth(&app.token)
            .send()
            .await
            .unwrap();
        assert_eq!(empty_id.status(), StatusCode::BAD_REQUEST, "DELETE {}?id=", path);
    }
}

#[tokio::test]
async fn test_update_without_id_is_bad_request_whatever_the_body() {
    let app = spawn_app().await;
    for path in ADMIN_PATHS {
        let wrong_type = app
            .client
            .put(app.url(path))
            .bearer_auth(&app.token)
            .json(&json!({ "order": "first" }))
            .send()
            .await
            .unwrap();
        assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST, "PUT {}", path);
        let body: Value = wrong_type.json().await.unwrap();
        assert_eq!(body["error"], "ID is required");

        // No content-type header at all.
        let untyped = app
            .client
            .put(app.url(path))
            .bearer_auth(&app.token)
            .body(r#"{"name":"x"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(untyped.status(), StatusCode::BAD_REQUEST, "PUT {} untyped", path);
    }
}

#[tokio::test]
async fn test_deleting_unknown_id_is_internal_failure() {
    let app = spawn_app().await;
    let response = app
        .client
        .delete(app.url(&format!("/api/admin/stats?id={}", uuid::Uuid::new_v4())))
        .bearer_auth(&app.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to delete stat");
}

#[tokio::test]
async fn test_job_opening_lifecycle() {
    let app = spawn_app().await;

    let created = create_as_admin(
        &app,
        "/api/admin/careers",
        json!({
            "title": "Backend Engineer",
            "department": "Engineering",
            "location": "Lisbon",
            "description": "APIs",
            "requirements": "Rust\nPostgres"
        }),
    )
    .await;
    let opening: JobOpening = serde_json::from_value(created.clone()).unwrap();
    assert_eq!(opening.job_type, "Full-time");
    assert!(opening.active);
    assert_eq!(opening.order, 0);
    assert_eq!(created["type"], "Full-time");

    let public: Vec<JobOpening> = app
        .client
        .get(app.url("/api/careers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(public.iter().any(|job| job.id == opening.id));

    // An anonymous create is rejected and leaves the table untouched.
    let rejected = app
        .client
        .post(app.url("/api/admin/careers"))
        .json(&json!({
            "title": "Intern", "department": "Ops", "location": "Remote",
            "description": "Help", "requirements": "Curiosity"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(list(&app, "/api/admin/careers").await.len(), 1);

    // Closing the position hides it from visitors.
    let updated: JobOpening = app
        .client
        .put(app.url("/api/admin/careers"))
        .bearer_auth(&app.token)
        .json(&json!({ "id": opening.id, "active": false, "type": "Contract" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!updated.active);
    assert_eq!(updated.job_type, "Contract");
    assert_eq!(updated.title, "Backend Engineer");
    assert!(list(&app, "/api/careers").await.is_empty());

    let deleted = app
        .client
        .delete(app.url(&format!("/api/admin/careers?id={}", opening.id)))
        .bearer_auth(&app.token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert!(list(&app, "/api/admin/careers").await.is_empty());
}

#[tokio::test]
async fn test_inactive_team_member_is_hidden_from_visitors() {
    let app = spawn_app().await;
    let hidden = create_as_admin(
        &app,
        "/api/admin/team",
        json!({ "name": "On Leave", "role": "CFO", "description": "Away", "active": false }),
    )
    .await;
    create_as_admin(
        &app,
        "/api/admin/team",
        json!({ "name": "Present", "role": "CEO", "description": "Here", "order": 1 }),
    )
    .await;

    let admin: Vec<TeamMember> = serde_json::from_value(Value::Array(
        list(&app, "/api/admin/team").await,
    ))
    .unwrap();
    assert_eq!(admin.len(), 2);

    let public: Vec<TeamMember> =
        serde_json::from_value(Value::Array(list(&app, "/api/team").await)).unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].name, "Present");
    assert!(public.iter().all(|member| member.id.to_string() != hidden["id"]));
}

#[tokio::test]
async fn test_created_records_carry_defaults() {
    let app = spawn_app().await;

    let stat: Stat = serde_json::from_value(
        create_as_admin(&app, "/api/admin/stats", json!({ "value": "99%", "label": "Uptime" }))
            .await,
    )
    .unwrap();
    assert_eq!(stat.icon, "Users");
    assert_eq!(stat.order, 0);

    let testimonial: Testimonial = serde_json::from_value(
        create_as_admin(
            &app,
            "/api/admin/testimonials",
            json!({ "name": "A", "role": "B", "company": "C", "content": "D", "rating": 0 }),
        )
        .await,
    )
    .unwrap();
    assert_eq!(testimonial.rating, 5);

    let member = create_as_admin(
        &app,
        "/api/admin/team",
        json!({ "name": "N", "role": "R", "description": "D" }),
    )
    .await;
    assert_eq!(member["image"], "/images/team/placeholder.jpg");
    assert!(member.get("createdAt").is_some());
}

#[tokio::test]
async fn test_session_cookie_grants_admin_access() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(app.url("/api/admin/stats"))
        .header("cookie", format!("theme=dark; session={}", app.token))
        .json(&json!({ "value": "7", "label": "Offices" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_openapi_document_lists_resources() {
    let app = spawn_app().await;
    let doc: Value = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for path in ADMIN_PATHS {
        assert!(doc["paths"].get(path).is_some(), "{} missing from docs", path);
    }
    assert!(doc["paths"].get("/api/auth/login").is_some());
}
