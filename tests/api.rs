//! Requests through the full router on the in-memory `test` profile

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use travelboard::config::{AppConfig, AppState};
use travelboard::models::member_model::MemberJoinRequest;
use travelboard::routes::build_app;

async fn app() -> Router {
    let state = AppState::in_memory(AppConfig::for_tests());
    for username in ["alice", "bob"] {
        state
            .members
            .join(MemberJoinRequest {
                username: username.into(),
                password: format!("{username}-pw"),
                email: format!("{username}@example.com"),
            })
            .await
            .unwrap();
    }
    state
        .members
        .ensure_admin(MemberJoinRequest {
            username: "admin".into(),
            password: "admin-pw".into(),
            email: "admin@example.com".into(),
        })
        .await
        .unwrap();

    build_app(Arc::new(state)).await.unwrap()
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Signs in and returns the session cookie
async fn login(app: &Router, username: &str, password: &str) -> String {
    let req = request(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_post(app: &Router, cookie: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/board",
            Some(cookie),
            Some(json!({ "title": title, "content": "hello" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["no"].as_i64().unwrap()
}

#[tokio::test]
async fn invalid_page_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, request(Method::GET, "/api/board?page=0", None, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "400");

    let (status, _) = send(&app, request(Method::GET, "/api/travel?amount=abc", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn page_beyond_addressable_rows_is_bad_request() {
    let app = app().await;
    let uri = "/api/board?page=4294967295&amount=4294967295";
    let (status, body) = send(&app, request(Method::GET, uri, None, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "400");

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/travel?page=4294967295&amount=4294967295", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_listing_has_zero_totals() {
    let app = app().await;
    let (status, body) = send(&app, request(Method::GET, "/api/board", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 0);
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let app = app().await;
    for uri in ["/api/board/999", "/api/travel/999", "/api/board/download/999", "/api/nowhere"] {
        let (status, _) = send(&app, request(Method::GET, uri, None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn anonymous_writes_are_unauthorized() {
    let app = app().await;
    let (status, body) = send(
        &app,
        request(Method::POST, "/api/board", None, Some(json!({ "title": "t", "content": "c" }))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "401");
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "nope" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn member_creates_and_searches_posts() {
    let app = app().await;
    let cookie = login(&app, "alice", "alice-pw").await;

    create_post(&app, &cookie, "Cherry blossoms in spring").await;
    create_post(&app, &cookie, "Autumn leaves").await;

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/board?type=T&keyword=SPRING&amount=5", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["amount"], 5);
    assert_eq!(body["items"][0]["writer"], "alice");

    let (_, body) = send(&app, request(Method::GET, "/api/board?keyword=%20%20", None, None)).await;
    assert_eq!(body["totalCount"], 2);

    let (status, body) = send(&app, request(Method::GET, "/api/auth/current_user", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn only_the_writer_may_change_a_post() {
    let app = app().await;
    let alice = login(&app, "alice", "alice-pw").await;
    let bob = login(&app, "bob", "bob-pw").await;
    let no = create_post(&app, &alice, "mine").await;
    let uri = format!("/api/board/{no}");

    let (status, _) = send(
        &app,
        request(Method::PUT, &uri, Some(&bob), Some(json!({ "title": "ours", "content": "x" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        request(Method::PUT, &uri, Some(&alice), Some(json!({ "title": "still mine", "content": "y" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "still mine");

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_route_checks_role() {
    let app = app().await;

    let (status, _) = send(&app, request(Method::GET, "/api/security/admin", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = login(&app, "alice", "alice-pw").await;
    let (status, _) = send(&app, request(Method::GET, "/api/security/admin", Some(&alice), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, "admin", "admin-pw").await;
    let (status, body) = send(&app, request(Method::GET, "/api/security/admin", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "admin");

    let (status, _) = send(&app, request(Method::GET, "/api/security/all", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn join_and_username_check() {
    let app = app().await;

    let (_, body) = send(&app, request(Method::GET, "/api/member/checkusername/alice", None, None)).await;
    assert_eq!(body, json!(true));
    let (_, body) = send(&app, request(Method::GET, "/api/member/checkusername/carol", None, None)).await;
    assert_eq!(body, json!(false));

    let join = json!({ "username": "carol", "password": "carol-pw", "email": "carol@example.com" });
    let (status, body) = send(&app, request(Method::POST, "/api/member", None, Some(join.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["auth_list"], json!(["ROLE_MEMBER"]));

    let (status, _) = send(&app, request(Method::POST, "/api/member", None, Some(join))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn password_change_requires_old_password() {
    let app = app().await;
    let bob = login(&app, "bob", "bob-pw").await;

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/member/bob/changepassword",
            Some(&bob),
            Some(json!({ "oldPassword": "wrong", "newPassword": "new-pw" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/member/alice/changepassword",
            Some(&bob),
            Some(json!({ "oldPassword": "alice-pw", "newPassword": "stolen" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/member/bob/changepassword",
            Some(&bob),
            Some(json!({ "oldPassword": "bob-pw", "newPassword": "new-pw" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(&app, "bob", "new-pw").await;
}
