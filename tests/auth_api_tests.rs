use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use eventboard::test_utils::test_helpers;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`
use tower_http::normalize_path::NormalizePath;

type App = NormalizePath<Router>;

async fn setup() -> App {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::test_app(test_helpers::test_state(pool))
}

async fn post_json(app: &App, uri: &str, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn signup(app: &App, email: &str, username: &str) -> (StatusCode, Value) {
    post_json(
        app,
        "/api/auth/signup",
        json!({
            "email": email,
            "username": username,
            "password": "s3cure-passw0rd",
            "password2": "s3cure-passw0rd",
        }),
        None,
    )
    .await
}

#[tokio::test]
async fn test_signup_returns_user_and_tokens() {
    let app = setup().await;

    let (status, body) = signup(&app, "new@example.com", "newbie").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "new@example.com");
    assert_eq!(body["user"]["username"], "newbie");
    assert_eq!(body["user"]["is_admin"], false);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["tokens"]["access"].is_string());
    assert!(body["tokens"]["refresh"].is_string());
}

#[tokio::test]
async fn test_signup_cannot_grant_admin() {
    let app = setup().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/signup",
        json!({
            "email": "sneaky@example.com",
            "username": "sneaky",
            "password": "s3cure-passw0rd",
            "password2": "s3cure-passw0rd",
            "is_admin": true,
        }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["is_admin"], false);
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = setup().await;

    let (status, body) = post_json(&app, "/api/auth/signup", json!({}), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["email", "username", "password", "password2"] {
        assert_eq!(body["errors"][field][0], "This field is required.");
    }

    let (status, body) = post_json(
        &app,
        "/api/auth/signup",
        json!({
            "email": "mismatch@example.com",
            "username": "mismatch",
            "password": "s3cure-passw0rd",
            "password2": "different-passw0rd",
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["password"].is_array());

    signup(&app, "taken@example.com", "taken").await;
    let (status, body) = signup(&app, "taken@example.com", "another").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());
}

#[tokio::test]
async fn test_login_success_and_generic_failure() {
    let app = setup().await;
    signup(&app, "login@example.com", "login").await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "login@example.com", "password": "s3cure-passw0rd" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "login");
    assert!(body["tokens"]["access"].is_string());

    let (wrong_pw_status, wrong_pw) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "login@example.com", "password": "wrong-password" }),
        None,
    )
    .await;
    let (unknown_status, unknown) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "nobody@example.com", "password": "s3cure-passw0rd" }),
        None,
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
    assert_eq!(wrong_pw["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = setup().await;

    let (status, body) = post_json(&app, "/api/auth/login", json!({ "email": "a@b.c" }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["password"].is_array());
    assert!(body["errors"].get("email").is_none());
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = setup().await;
    let (_, body) = signup(&app, "refresh@example.com", "refresher").await;
    let refresh = body["tokens"]["refresh"].as_str().unwrap().to_string();
    let access = body["tokens"]["access"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        &app,
        "/api/auth/token/refresh",
        json!({ "refresh": refresh }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["access"].as_str().unwrap().to_string();

    // The new token works on a protected route
    let request = Request::builder()
        .uri("/api/saved-events")
        .header(header::AUTHORIZATION, format!("Bearer {}", new_access))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Access tokens cannot be used to refresh
    let (status, _) = post_json(
        &app,
        "/api/auth/token/refresh",
        json!({ "refresh": access }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_json(
        &app,
        "/api/auth/token/refresh",
        json!({ "refresh": "garbage" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout() {
    let app = setup().await;
    let (_, body) = signup(&app, "bye@example.com", "bye").await;
    let access = body["tokens"]["access"].as_str().unwrap().to_string();

    let (status, body) = post_json(&app, "/api/auth/logout", json!({}), Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, _) = post_json(&app, "/api/auth/logout", json!({}), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trailing_slash_paths_match() {
    let app = setup().await;
    signup(&app, "slash@example.com", "slash").await;
    let credentials = json!({ "email": "slash@example.com", "password": "s3cure-passw0rd" });

    let (plain_status, plain) = post_json(&app, "/api/auth/login", credentials.clone(), None).await;
    let (slash_status, slash) = post_json(&app, "/api/auth/login/", credentials, None).await;

    assert_eq!(plain_status, StatusCode::OK);
    assert_eq!(slash_status, StatusCode::OK);
    assert_eq!(plain["user"], slash["user"]);
    assert_eq!(slash["message"], "Login successful");
}

#[tokio::test]
async fn test_array_bodies_are_rejected() {
    let app = setup().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/signup",
        json!(["arr@example.com", "arr", "s3cure-passw0rd", "s3cure-passw0rd"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        json!(["arr@example.com", "s3cure-passw0rd"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
