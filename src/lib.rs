use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;

// Module for routing segregation (Public, Account, Employees, Admin).
pub mod routes;
use auth::AuthUser; // The resolved authenticated principal.
use routes::{account, admin, employees, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point (main.rs).
pub use auth::AuthService;
pub use config::AppConfig;
pub use directory::DirectoryService;
pub use repository::{JsonFileRepository, MemoryRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the application from
/// the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` annotations. The resulting
/// JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::list_employees, handlers::get_employee,
        handlers::create_employee, handlers::update_employee, handlers::delete_employee,
        handlers::change_password, handlers::change_username, handlers::get_profile,
        handlers::get_admin_data
    ),
    components(
        schemas(
            models::Role, models::Employee, models::UserSummary, models::LoginRequest,
            models::LoginResponse, models::ChangePasswordRequest, models::ChangeUsernameRequest,
            models::ChangeUsernameResponse, models::CreateEmployeeRequest,
            models::CreateEmployeeResponse, models::ProvisionedAccount,
            models::UpdateEmployeeRequest, models::MessageResponse, models::DepartmentStats,
            models::AdminData, models::ProfileUser, models::AdminProfile, models::ProfileResponse,
        )
    ),
    tags(
        (name = "staff-api", description = "Employee Directory API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: the single, thread-safe, immutable
/// container holding all essential application services and configuration, shared
/// across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer: the two flat record collections behind the Repository trait.
    pub repo: RepositoryState,
    /// Credential verification, token lifecycle, credential mutation.
    pub auth: AuthService,
    /// Employee CRUD, provisioning, and the admin aggregation, policy-gated.
    pub directory: DirectoryService,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the services around a repository and configuration. Used by main and by
    /// the integration tests, which substitute an in-memory repository.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let auth = AuthService::new(repo.clone(), &config);
        let directory = DirectoryService::new(repo.clone(), &config);
        Self {
            repo,
            auth,
            directory,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Allow handlers and extractors to selectively pull components from the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the protected route modules. It attempts to extract
/// `AuthUser` from the request; if token validation fails the extractor rejects the
/// request with a 401 before the handler runs. The handlers extract `AuthUser`
/// themselves for the actual principal — decoding a token twice is cheap and keeps
/// each handler independently testable.
async fn auth_middleware(_principal: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Protected routes: everything else requires a valid token. Role and
        // ownership checks happen per-operation in the services via the policy.
        .merge(
            account::account_routes()
                .merge(employees::employee_routes())
                .merge(admin::admin_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .with_state(state);

    // Observability and correlation layers (applied outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // Generate a unique id for every incoming request...
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // ...wrap the request in a tracing span carrying it...
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // ...and echo it back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes TraceLayer's span creation to include the `x-request-id` header in the
/// structured logging metadata alongside method and URI, so every log line for a
/// single request is correlated by a unique id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
