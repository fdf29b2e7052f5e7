use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Employees Router Module
///
/// The directory resource. Listing, creation, and deletion are admin-only; reading
/// and updating a single record follow the self-or-admin rule. Those decisions are
/// made by the authorization policy inside the directory service, not here — this
/// module only guarantees that a valid principal exists (via the auth layer applied
/// in `create_router`).
pub fn employee_routes() -> Router<AppState> {
    Router::new()
        // GET /api/employees        (admin) — full directory listing.
        // POST /api/employees       (admin) — provision employee + paired account.
        .route(
            "/api/employees",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        // GET /api/employees/{id}    (self-or-admin) — single record.
        // PUT /api/employees/{id}    (self-or-admin) — update; owners are limited to
        //                            phone/address/email.
        // DELETE /api/employees/{id} (admin) — remove with account cascade.
        .route(
            "/api/employees/{id}",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
}
