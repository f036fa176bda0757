use announcement_board::session::{
    COOKIE_NAME, cleared_session_cookie, cookie_value, is_cookie_safe, issue_session_token,
    parse_cookie, session_cookie, session_is_valid, session_token_for,
};
use axum::http::{HeaderMap, HeaderValue, header};

const LONG_SECRET: &str = "a-much-longer-shared-secret-value";

// --- Cookie Parsing ---

#[test]
fn test_cookie_as_only_pair() {
    assert_eq!(cookie_value("token=abc", COOKIE_NAME), Some("abc".to_string()));
}

#[test]
fn test_cookie_inside_a_list() {
    assert_eq!(
        cookie_value("token=abc; theme=dark", COOKIE_NAME),
        Some("abc".to_string())
    );
    assert_eq!(
        cookie_value("theme=dark; token=abc; lang=en", COOKIE_NAME),
        Some("abc".to_string())
    );
    assert_eq!(
        cookie_value("theme=dark;token=abc", COOKIE_NAME),
        Some("abc".to_string())
    );
}

#[test]
fn test_cookie_name_must_match_exactly() {
    assert_eq!(cookie_value("mytoken=abc", COOKIE_NAME), None);
    assert_eq!(cookie_value("token_x=abc; lang=en", COOKIE_NAME), None);
}

#[test]
fn test_missing_or_empty_cookie() {
    assert_eq!(cookie_value("", COOKIE_NAME), None);
    assert_eq!(cookie_value("theme=dark", COOKIE_NAME), None);
    assert_eq!(cookie_value("token=", COOKIE_NAME), None);
}

#[test]
fn test_parse_cookie_across_multiple_headers() {
    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
    headers.append(header::COOKIE, HeaderValue::from_static("lang=en; token=xyz"));

    assert_eq!(parse_cookie(&headers, COOKIE_NAME), Some("xyz".to_string()));
}

#[test]
fn test_parse_cookie_without_header() {
    assert_eq!(parse_cookie(&HeaderMap::new(), COOKIE_NAME), None);
}

// --- Session Tokens ---

#[test]
fn test_short_secret_is_used_verbatim() {
    let token = session_token_for("secret123").unwrap();
    assert_eq!(token, "secret123");
    assert!(session_is_valid(&token, "secret123"));
}

#[test]
fn test_long_secret_gets_a_signed_token() {
    let token = session_token_for(LONG_SECRET).unwrap();
    assert_ne!(token, LONG_SECRET);
    assert!(!token.contains(LONG_SECRET));
    assert!(session_is_valid(&token, LONG_SECRET));
}

#[test]
fn test_tokens_are_unique_per_login() {
    let first = issue_session_token(LONG_SECRET).unwrap();
    let second = issue_session_token(LONG_SECRET).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_short_secrets_outside_cookie_octets_get_a_signed_token() {
    for secret in ["密码", "a;b", "two words", "quo\"te"] {
        let token = session_token_for(secret).unwrap();
        assert_ne!(token, secret, "{}", secret);
        assert!(is_cookie_safe(&token), "{}", secret);
        assert!(session_is_valid(&token, secret), "{}", secret);

        // The issued cookie survives a trip through a Cookie header.
        let mut headers = HeaderMap::new();
        let set_cookie = session_cookie(&token);
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        let parsed = parse_cookie(&headers, COOKIE_NAME).unwrap();
        assert!(session_is_valid(&parsed, secret), "{}", secret);
    }
}

#[test]
fn test_cookie_safe_characters() {
    assert!(is_cookie_safe("secret123"));
    assert!(is_cookie_safe("a-b_c.d!~"));
    assert!(!is_cookie_safe(""));
    assert!(!is_cookie_safe("a;b"));
    assert!(!is_cookie_safe("a b"));
    assert!(!is_cookie_safe("a,b"));
    assert!(!is_cookie_safe("a\\b"));
    assert!(!is_cookie_safe("密码"));
}

#[test]
fn test_token_signed_with_another_secret_is_rejected() {
    let token = issue_session_token("some-other-secret-of-enough-length").unwrap();
    assert!(!session_is_valid(&token, LONG_SECRET));
}

#[test]
fn test_garbage_and_tampered_tokens_are_rejected() {
    assert!(!session_is_valid("not-a-token", LONG_SECRET));
    assert!(!session_is_valid("", LONG_SECRET));

    let mut token = issue_session_token(LONG_SECRET).unwrap();
    token.push('x');
    assert!(!session_is_valid(&token, LONG_SECRET));
}

// --- Set-Cookie Values ---

#[test]
fn test_session_cookie_attributes() {
    let value = session_cookie("secret123");
    let cookie = value.to_str().unwrap();

    assert!(cookie.starts_with("token=secret123"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
}

#[test]
fn test_cleared_cookie_expires_immediately() {
    let value = cleared_session_cookie();
    let cookie = value.to_str().unwrap();

    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("1970"));
}
