use announcement_board::{
    auth::{AuthResult, api_token_matches, authorize},
    config::AuthConfig,
    session,
};
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};

const HOME: &str = "/board";

// --- Helpers ---

fn guarded() -> AuthConfig {
    AuthConfig::new(Some("secret123"), Some("api-token"))
}

fn get(path: &str) -> Request {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn post_form(path: &str, body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn expect_response(result: AuthResult) -> Response {
    match result {
        AuthResult::Allowed(_) => panic!("request should not have been allowed"),
        AuthResult::Authenticated(response)
        | AuthResult::Challenge(response)
        | AuthResult::Denied(response) => response,
    }
}

// --- Decision Table ---

#[tokio::test]
async fn test_no_secret_allows_everything() {
    let open = AuthConfig::default();
    assert!(authorize(get("/"), &open, HOME).await.is_allowed());
    assert!(authorize(get("/admin"), &open, HOME).await.is_allowed());
    assert!(
        authorize(get("/api/announcements"), &open, HOME)
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_api_path_with_valid_bearer_token() {
    let request = Request::builder()
        .uri("/api/announcements")
        .header(header::AUTHORIZATION, "Bearer api-token")
        .body(Body::empty())
        .unwrap();
    assert!(authorize(request, &guarded(), HOME).await.is_allowed());
}

#[tokio::test]
async fn test_api_path_rejects_bad_token_even_with_cookie() {
    let request = Request::builder()
        .uri("/api/announcements/x")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .header(header::COOKIE, "token=secret123")
        .body(Body::empty())
        .unwrap();

    let result = authorize(request, &guarded(), HOME).await;
    assert!(matches!(result, AuthResult::Denied(_)));

    let response = expect_response(result);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("valid API token"));
}

#[tokio::test]
async fn test_valid_cookie_allows_pages() {
    let request = Request::builder()
        .uri("/admin")
        .header(header::COOKIE, "theme=dark; token=secret123")
        .body(Body::empty())
        .unwrap();
    assert!(authorize(request, &guarded(), HOME).await.is_allowed());
}

#[tokio::test]
async fn test_signed_session_cookie_allows_pages() {
    let secret = "a-much-longer-shared-secret-value";
    let config = AuthConfig::new(Some(secret), None);
    let token = session::issue_session_token(secret).unwrap();

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap();
    assert!(authorize(request, &config, HOME).await.is_allowed());
}

#[tokio::test]
async fn test_wrong_cookie_gets_the_login_page() {
    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "token=guess")
        .body(Body::empty())
        .unwrap();

    let response = expect_response(authorize(request, &guarded(), HOME).await);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("name=\"password\""));
}

#[tokio::test]
async fn test_correct_password_redirects_home_with_cookie() {
    let result = authorize(post_form("/admin", "password=secret123"), &guarded(), HOME).await;
    assert!(matches!(result, AuthResult::Authenticated(_)));

    let response = expect_response(result);
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/board");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token=secret123"));
}

#[tokio::test]
async fn test_submitted_password_is_trimmed() {
    let result = authorize(post_form("/", "password=+secret123+"), &guarded(), HOME).await;
    assert!(matches!(result, AuthResult::Authenticated(_)));
}

#[tokio::test]
async fn test_wrong_password_shows_error_page() {
    let response =
        expect_response(authorize(post_form("/", "password=wrong"), &guarded(), HOME).await);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(response).await.contains("Incorrect password"));
}

#[tokio::test]
async fn test_post_without_password_gets_bare_challenge() {
    let response =
        expect_response(authorize(post_form("/", "name=value"), &guarded(), HOME).await);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!body_string(response).await.contains("Incorrect password"));
}

#[tokio::test]
async fn test_untyped_body_is_read_as_form() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::from("password=secret123"))
        .unwrap();
    let result = authorize(request, &guarded(), HOME).await;
    assert!(matches!(result, AuthResult::Authenticated(_)));
}

#[tokio::test]
async fn test_api_login_with_json_password() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"password":"secret123"}"#))
        .unwrap();

    let response = expect_response(authorize(request, &guarded(), HOME).await);
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::SET_COOKIE));
    assert_eq!(body_string(response).await, r#"{"success":true}"#);
}

#[tokio::test]
async fn test_api_login_with_wrong_password() {
    let response = expect_response(
        authorize(post_form("/api/login", "password=wrong"), &guarded(), HOME).await,
    );
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Incorrect password"}"#
    );
}

#[tokio::test]
async fn test_guard_responses_disable_caching() {
    let response = expect_response(authorize(get("/"), &guarded(), HOME).await);
    let cache_control = response.headers()[header::CACHE_CONTROL].to_str().unwrap();
    assert!(cache_control.contains("no-store"));
    assert_eq!(response.headers()[header::PRAGMA], "no-cache");
}

// --- Token Matching ---

#[test]
fn test_api_token_matching() {
    let mut headers = HeaderMap::new();
    assert!(!api_token_matches(&headers, Some("api-token")));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("api-token"));
    assert!(api_token_matches(&headers, Some("api-token")));

    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer api-token"),
    );
    assert!(api_token_matches(&headers, Some("api-token")));
    // An unconfigured token never matches.
    assert!(!api_token_matches(&headers, None));
}
