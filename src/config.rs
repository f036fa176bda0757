use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and never
/// mutated afterwards; it is handed to the router and the auth guard explicitly through
/// `AppState`, so nothing reads the environment while serving requests.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and fail-fast checks.
    pub env: Env,
    // Normalised base path the board is mounted under ("" when mounted at the root).
    pub base_path: String,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    // Items per page for both HTML views and the JSON listing.
    pub page_size: usize,
    // Upper bound on the number of keys fetched per listing.
    pub list_limit: usize,
    pub bind_addr: String,
    // Serve the OpenAPI document at /api-docs/openapi.json. Off unless API_DOCS opts in.
    pub api_docs: bool,
}

/// AuthConfig
///
/// Credentials checked by the auth guard. `None` means "not configured".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthConfig {
    /// The shared secret used for the login form and session cookies.
    pub secret: Option<String>,
    /// The token accepted on API paths via the `Authorization` header.
    pub api_token: Option<String>,
}

impl AuthConfig {
    pub fn new(secret: Option<&str>, api_token: Option<&str>) -> Self {
        Self {
            secret: secret.map(str::to_string),
            api_token: api_token.map(str::to_string),
        }
    }
}

/// StoreConfig
///
/// Selects and parameterises the key-value store binding.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_key: String,
    pub s3_secret: String,
    pub s3_bucket: String,
    pub s3_prefix: String,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StoreBackend {
    Memory,
    S3,
    // No store bound; every data operation reports the store as unavailable.
    Disabled,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences and
/// production-grade behaviour.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_BASE_PATH: &str = "/board";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LIST_LIMIT: usize = 1000;

impl Default for StoreConfig {
    fn default() -> Self {
        // Default MinIO credentials for local convenience.
        Self {
            backend: StoreBackend::Memory,
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "announcements".to_string(),
            s3_prefix: "announcements/".to_string(),
        }
    }
}

impl Default for AppConfig {
    /// Provides a safe, non-panicking AppConfig for test setup: an open board (no secret)
    /// mounted at the default base path over the in-memory store.
    fn default() -> Self {
        Self {
            env: Env::Local,
            base_path: DEFAULT_BASE_PATH.to_string(),
            auth: AuthConfig::default(),
            store: StoreConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            list_limit: DEFAULT_LIST_LIMIT,
            bind_addr: "0.0.0.0:3000".to_string(),
            api_docs: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from environment variables and implements the **fail-fast**
    /// principle for production.
    ///
    /// # Panics
    /// Panics in `production` when the shared secret is missing, or when the S3 backend is
    /// selected without credentials. Starting an unprotected or storage-less board in
    /// production is treated as a deployment error.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // AUTH_KEY wins; PW is the legacy name.
        let secret = non_empty_var("AUTH_KEY").or_else(|| non_empty_var("PW"));
        if env == Env::Production && secret.is_none() {
            panic!("FATAL: AUTH_KEY must be set in production.");
        }

        let auth = AuthConfig {
            secret,
            api_token: non_empty_var("API_TOKEN"),
        };

        let backend = match non_empty_var("STORE_BACKEND").as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("s3") => StoreBackend::S3,
            Some("none") => StoreBackend::Disabled,
            _ if env == Env::Production => StoreBackend::S3,
            _ => StoreBackend::Memory,
        };

        let defaults = StoreConfig::default();
        let store = match (&env, backend) {
            (Env::Production, StoreBackend::S3) => StoreConfig {
                backend,
                s3_endpoint: env::var("S3_ENDPOINT").expect("FATAL: S3_ENDPOINT required in prod"),
                s3_region: env::var("S3_REGION").unwrap_or_else(|_| "stub".to_string()),
                s3_key: env::var("S3_ACCESS_KEY").expect("FATAL: S3_ACCESS_KEY required in prod"),
                s3_secret: env::var("S3_SECRET_KEY")
                    .expect("FATAL: S3_SECRET_KEY required in prod"),
                s3_bucket: env::var("S3_BUCKET_NAME").unwrap_or(defaults.s3_bucket),
                s3_prefix: env::var("S3_KEY_PREFIX").unwrap_or(defaults.s3_prefix),
            },
            _ => StoreConfig {
                backend,
                s3_endpoint: env::var("S3_ENDPOINT").unwrap_or(defaults.s3_endpoint),
                s3_region: env::var("S3_REGION").unwrap_or(defaults.s3_region),
                s3_key: env::var("S3_ACCESS_KEY").unwrap_or(defaults.s3_key),
                s3_secret: env::var("S3_SECRET_KEY").unwrap_or(defaults.s3_secret),
                s3_bucket: env::var("S3_BUCKET_NAME").unwrap_or(defaults.s3_bucket),
                s3_prefix: env::var("S3_KEY_PREFIX").unwrap_or(defaults.s3_prefix),
            },
        };

        Self {
            env,
            base_path: normalize_base_path(
                &env::var("HOME_URL").unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string()),
            ),
            auth,
            store,
            page_size: parse_var("PAGE_SIZE").unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            list_limit: parse_var("LIST_LIMIT").unwrap_or(DEFAULT_LIST_LIMIT).max(1),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            api_docs: flag_var("API_DOCS"),
        }
    }

    /// The URL path of the board's list view; the redirect target after login and logout.
    pub fn home_path(&self) -> String {
        if self.base_path.is_empty() {
            "/".to_string()
        } else {
            self.base_path.clone()
        }
    }
}

/// normalize_base_path
///
/// Produces the canonical mount prefix: leading slash, no trailing slash, lowercase.
/// A root mount ("/" or "") becomes the empty prefix.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('/') {
        lower
    } else {
        format!("/{}", lower)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn flag_var(key: &str) -> bool {
    non_empty_var(key)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_var(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
