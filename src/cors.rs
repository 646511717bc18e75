//! Cross-origin resource sharing (CORS) policy for browser clients.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// The origin of the web client during local development.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// The allowed origin that stands for every origin.
const WILDCARD_ORIGIN: &str = "*";

/// The origins that are allowed to make credentialed requests to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Origins such as "http://localhost:3000". Must match the `Origin` header exactly.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_owned()],
        }
    }
}

impl CorsConfig {
    /// Create a config from a list of origins.
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Build the CORS layer.
    ///
    /// Any method and request header is allowed. Credentials rule out the `*` wildcard, so the
    /// requested method and headers are mirrored back instead. For the same reason an allowed
    /// origin of `*` mirrors the request's `Origin` header, allowing every origin.
    ///
    /// Origins that are not valid header values are skipped with a warning.
    pub fn layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(self.allow_origin())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }

    fn allow_origin(&self) -> AllowOrigin {
        if self.allows_any_origin() {
            tracing::warn!("CORS: all origins are allowed to make credentialed requests");
            return AllowOrigin::mirror_request();
        }

        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .inspect_err(|error| {
                        tracing::warn!("Ignoring invalid CORS origin {origin:?}: {error}")
                    })
                    .ok()
            })
            .collect();

        AllowOrigin::list(origins)
    }

    fn allows_any_origin(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == WILDCARD_ORIGIN)
    }
}
