use axum::{
    http::{HeaderName, HeaderValue, header},
    response::Response,
};

/// no_cache_headers
///
/// The cache-suppression set carried by every board response, so intermediaries never
/// replay an auth decision or a stale listing.
pub fn no_cache_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
        (
            HeaderName::from_static("surrogate-control"),
            HeaderValue::from_static("no-store"),
        ),
        (
            HeaderName::from_static("cdn-cache-control"),
            HeaderValue::from_static("no-store"),
        ),
    ]
}

/// disable_caching
///
/// Response mapper applied to the whole router.
pub async fn disable_caching(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in no_cache_headers() {
        headers.insert(name, value);
    }
    response
}
