use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. Login is the only gateway into the
/// authenticated surface; everything else in the application sits behind the
/// AuthUser middleware layer.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /api/login
        // Credential verification and token issuance.
        .route("/api/login", post(handlers::login))
}
