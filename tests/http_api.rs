use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use rebac::{middleware::auth::USER_ID_HEADER, routes::build_router, AppState};

fn app() -> Router {
    build_router(AppState::in_memory())
}

async fn send(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_org(app: &Router, user: &str, slug: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/orgs",
        Some(user),
        Some(json!({ "name": slug, "slug": slug })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_needs_no_identity() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/orgs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn org_lifecycle_maps_errors_to_status_codes() {
    let app = app();
    let org_id = create_org(&app, "alice", "acme").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orgs",
        Some("bob"),
        Some(json!({ "name": "Acme", "slug": "acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let org_uri = format!("/api/orgs/{org_id}");
    let (status, _) = send(&app, Method::GET, &org_uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let members_uri = format!("/api/orgs/{org_id}/members");
    let (status, _) = send(
        &app,
        Method::POST,
        &members_uri,
        Some("alice"),
        Some(json!({ "userId": "bob", "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &members_uri,
        Some("alice"),
        Some(json!({ "userId": "bob", "role": "member" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "member");

    // Um member não passa pelo guard de Manage.
    let (status, _) = send(
        &app,
        Method::POST,
        &members_uri,
        Some("bob"),
        Some(json!({ "userId": "carol", "role": "member" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let self_uri = format!("/api/orgs/{org_id}/members/alice");
    let (status, _) = send(&app, Method::DELETE, &self_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/orgs", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "acme");
    assert_eq!(body[0]["role"], "member");

    let (status, _) = send(&app, Method::DELETE, &org_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &org_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_endpoint_answers_for_projects() {
    let app = app();
    let org_id = create_org(&app, "alice", "acme").await;

    let (status, project) = send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/projects"),
        Some("alice"),
        Some(json!({ "name": "Web", "slug": "web" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["id"].as_str().unwrap();

    let allowed = format!(
        "/api/authz/check?action=manage&resourceType=project&resourceId={project_id}"
    );
    let (status, body) = send(&app, Method::GET, &allowed, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);

    let (_, body) = send(&app, Method::GET, &allowed, Some("mallory"), None).await;
    assert_eq!(body["allowed"], false);

    let unknown = format!("/api/authz/check?action=view&resourceType=team&resourceId={project_id}");
    let (status, body) = send(&app, Method::GET, &unknown, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
}

#[tokio::test]
async fn memberships_can_be_filtered_by_type() {
    let app = app();
    let org_id = create_org(&app, "alice", "acme").await;
    send(
        &app,
        Method::POST,
        &format!("/api/orgs/{org_id}/projects"),
        Some("alice"),
        Some(json!({ "name": "Web", "slug": "web" })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/me/memberships", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/me/memberships?resourceType=project",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn member_routes_report_missing_resources_as_not_found() {
    let app = app();
    let missing = uuid::Uuid::new_v4();
    create_org(&app, "alice", "acme").await;

    for resource in ["orgs", "projects"] {
        let members_uri = format!("/api/{resource}/{missing}/members");

        let (status, _) = send(&app, Method::GET, &members_uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {members_uri}");

        let (status, _) = send(
            &app,
            Method::POST,
            &members_uri,
            Some("alice"),
            Some(json!({ "userId": "bob", "role": "member" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "POST {members_uri}");

        let member_uri = format!("{members_uri}/bob");
        let (status, _) = send(
            &app,
            Method::PATCH,
            &member_uri,
            Some("alice"),
            Some(json!({ "role": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PATCH {member_uri}");

        let (status, _) = send(&app, Method::DELETE, &member_uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {member_uri}");
    }
}
