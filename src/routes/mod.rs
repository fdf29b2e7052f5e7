/// Router Module Index
///
/// Organizes the routing surface into security-segregated modules so access control
/// is applied explicitly at the module level via Axum layers, preventing accidental
/// exposure of protected endpoints.

/// Unauthenticated routes: health check and login.
pub mod public;

/// Account self-service for any authenticated principal: profile and credential changes.
pub mod account;

/// The employee directory resource. Authenticated; per-operation authorization
/// (admin-only vs. self-or-admin) is decided by the policy inside the services.
pub mod employees;

/// Admin-only aggregation endpoints.
pub mod admin;
