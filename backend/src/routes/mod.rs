//! Route definitions for the CampusBridge API
//!
//! Assembles the router, the middleware stack, and the route exemption
//! table the guard consults. Exemptions live here, next to the routes they
//! describe, and are built once at startup.

use crate::auth::{require_auth, RouteExemptions};
use crate::config::AppConfig;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod companies;
mod health;
mod students;

#[cfg(test)]
mod guard_tests;

pub use companies::company_routes;
pub use students::student_routes;

/// Exemption table for the guard.
///
/// Group entries set the default per prefix; per-route entries override
/// them (signup/login/logout are open, everything else under an account
/// prefix requires a token). Logout is exempt because it must return OK
/// whether or not a session exists.
pub fn route_exemptions() -> RouteExemptions {
    RouteExemptions::new()
        .group("/health", true)
        .group("/students", false)
        .group("/companies", false)
        .route(Method::POST, "/students/signup", true)
        .route(Method::POST, "/students/login", true)
        .route(Method::POST, "/students/logout", true)
        .route(Method::POST, "/companies/signup", true)
        .route(Method::POST, "/companies/login", true)
        .route(Method::POST, "/companies/logout", true)
}

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/students", student_routes())
        .nest("/companies", company_routes())
        // The guard runs innermost: every request passes it before any handler
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer(state.config()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser frontend. Credentials (the session cookie) require a
/// concrete origin rather than a wildcard.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = config
        .server
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| {
            tracing::warn!(
                cors_origin = %config.server.cors_origin,
                "configured CORS origin is not a valid header value, falling back to http://localhost:5173"
            );
            HeaderValue::from_static("http://localhost:5173")
        });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_falls_back_on_malformed_origin() {
        let mut config = AppConfig::default();
        config.server.cors_origin = "not a header\nvalue".to_string();
        // Must not panic; the layer is built with the localhost fallback
        let _ = cors_layer(&config);
    }
}
