use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Aggregation endpoints restricted to admin principals. Authentication is enforced
/// by the layer above; the admin role check happens in the service via the policy.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/data
        // Per-department statistics and totals over the employee collection.
        .route("/api/admin/data", get(handlers::get_admin_data))
}
