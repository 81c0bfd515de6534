/// Server configuration loaded from environment variables.
pub struct Config {
    pub port: u16,
    /// Base URL of the hosted store's REST interface (e.g. `https://x.example.co/rest/v1`).
    /// When absent the server runs against the in-memory fixture store.
    pub store_url: Option<String>,
    /// Service-role key for the hosted store. Config and data reads both use it;
    /// the scope resolver is the authorization gate, not store-side row policies.
    pub store_service_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// HS256 secret for verifying caller session tokens.
    pub jwt_secret: Option<String>,
    /// Shared token gating the admin inspection and test-chat endpoints.
    pub admin_token: Option<String>,
    pub sentry_dsn: Option<String>,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_raw_values(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("STORE_URL").ok().as_deref(),
            std::env::var("STORE_SERVICE_KEY").ok().as_deref(),
            std::env::var("GEMINI_API_KEY").ok().as_deref(),
            std::env::var("JWT_SECRET").ok().as_deref(),
            std::env::var("ADMIN_TOKEN").ok().as_deref(),
            std::env::var("SENTRY_DSN").ok().as_deref(),
            std::env::var("ENVIRONMENT").ok().as_deref(),
        )
    }

    /// Build a Config from raw string values (as they would come from env vars).
    /// Used directly in tests to avoid mutating process-global environment.
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw_values(
        port: Option<&str>,
        store_url: Option<&str>,
        store_service_key: Option<&str>,
        gemini_api_key: Option<&str>,
        jwt_secret: Option<&str>,
        admin_token: Option<&str>,
        sentry_dsn: Option<&str>,
        environment: Option<&str>,
    ) -> Self {
        fn non_empty(v: Option<&str>) -> Option<String> {
            v.filter(|s| !s.is_empty()).map(String::from)
        }

        let port = port.and_then(|v| v.parse().ok()).unwrap_or(8082);

        let environment = non_empty(environment).unwrap_or_else(|| "local".to_string());

        Config {
            port,
            store_url: non_empty(store_url).map(|u| u.trim_end_matches('/').to_string()),
            store_service_key: non_empty(store_service_key),
            gemini_api_key: non_empty(gemini_api_key),
            jwt_secret: non_empty(jwt_secret),
            admin_token: non_empty(admin_token),
            sentry_dsn: non_empty(sentry_dsn),
            environment,
        }
    }
}
