use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Account Router Module
///
/// Self-service routes available to every authenticated principal, admin or
/// employee. All handlers resolve the caller from the validated token; none of them
/// accept a target user in the payload.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        // GET /api/profile
        // The caller's own profile view (employee record or admin rollup).
        .route("/api/profile", get(handlers::get_profile))
        // POST /api/change-password
        // Re-hashes the credential after verifying the current password.
        .route("/api/change-password", post(handlers::change_password))
        // POST /api/change-username
        // Renames the account; mirrored onto the linked employee record.
        .route("/api/change-username", post(handlers::change_username))
}
