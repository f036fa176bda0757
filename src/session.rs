use axum::http::{HeaderMap, HeaderValue, header};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "token";
/// Session lifetime, both as cookie Max-Age and as token expiry.
pub const SESSION_MAX_AGE_DAYS: i64 = 7;
/// Secrets at least this long are never placed in a cookie verbatim.
pub const SHORT_SECRET_LIMIT: usize = 20;

/// SessionClaims
///
/// Payload of the per-login session token issued for long secrets. The token is signed
/// with the shared secret itself, so verification needs no server-side session table.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Random per-login identifier.
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// parse_cookie
///
/// Returns the trimmed value of cookie `name` from every `Cookie` header on the request.
/// Accepts the cookie as the only pair, inside a semicolon-delimited list, or anywhere
/// in the middle of one. Malformed pairs are skipped rather than failing the whole header.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| cookie_value(raw, name))
}

/// Looks up `name` in a single raw `Cookie` header string.
pub fn cookie_value(raw: &str, name: &str) -> Option<String> {
    Cookie::split_parse(raw)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// session_token_for
///
/// Chooses the cookie value for a successful login: short secrets made only of cookie-safe
/// characters are used as-is, everything else gets a freshly signed token.
pub fn session_token_for(secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    if secret.len() < SHORT_SECRET_LIMIT && is_cookie_safe(secret) {
        return Ok(secret.to_string());
    }
    issue_session_token(secret)
}

/// True when every byte is an RFC 6265 `cookie-octet`: printable ASCII except
/// whitespace, `"`, `,`, `;` and backslash.
pub fn is_cookie_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

pub fn issue_session_token(secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = SessionClaims {
        jti: Uuid::new_v4(),
        iat: now as usize,
        exp: (now + Duration::days(SESSION_MAX_AGE_DAYS).whole_seconds()) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// session_is_valid
///
/// A cookie is valid when it carries the secret itself or a session token signed with
/// the secret that has not yet expired.
pub fn session_is_valid(value: &str, secret: &str) -> bool {
    if value == secret {
        return true;
    }
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<SessionClaims>(
        value,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .is_ok()
}

/// The `Set-Cookie` value that starts a session.
pub fn session_cookie(value: &str) -> HeaderValue {
    let cookie = Cookie::build((COOKIE_NAME, value.to_string()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
        .build();
    to_header_value(&cookie)
}

/// The `Set-Cookie` value that ends a session.
pub fn cleared_session_cookie() -> HeaderValue {
    let cookie = Cookie::build((COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build();
    to_header_value(&cookie)
}

fn to_header_value(cookie: &Cookie<'_>) -> HeaderValue {
    // Session values are the secret, a JWT, or empty; a value the header cannot carry
    // degrades to an expired cookie instead of a panic.
    HeaderValue::from_str(&cookie.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("token=; Path=/; Max-Age=0"))
}
