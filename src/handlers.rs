use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        AdminData, ChangePasswordRequest, ChangeUsernameRequest, ChangeUsernameResponse,
        CreateEmployeeRequest, CreateEmployeeResponse, Employee, LoginRequest, LoginResponse,
        MessageResponse, ProfileResponse, UpdateEmployeeRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Presence check for the Option-typed request fields: the original API reports a 400
/// with a message for a missing field, never a serde rejection. Empty strings count
/// as missing.
fn required(field: Option<String>, message: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

/// login
///
/// [Public Route] Verifies credentials and issues a bearer token carrying the
/// principal snapshot. Issuance is stateless.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let missing = "Username and password are required";
    let username = required(payload.username, missing)?;
    let password = required(payload.password, missing)?;

    let (token, user) = state.auth.authenticate(&username, &password).await?;
    tracing::info!(user_id = user.id, "login succeeded");
    Ok(Json(LoginResponse { token, user }))
}

/// list_employees
///
/// [Admin Route] Lists every employee record.
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = [Employee]),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn list_employees(
    principal: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(state.directory.list_all(&principal).await?))
}

/// get_employee
///
/// [Self-or-Admin Route] Retrieves one employee; the owning employee may read their
/// own record, admins may read any.
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Found", body = Employee),
        (status = 403, description = "Not owner or admin", body = MessageResponse),
        (status = 404, description = "No such employee", body = MessageResponse)
    )
)]
pub async fn get_employee(
    principal: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.directory.get_by_id(&principal, id).await?))
}

/// create_employee
///
/// [Admin Route] Provisions a new employee together with their credential record and
/// echoes the generated username and default password back once.
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Provisioned", body = CreateEmployeeResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn create_employee(
    principal: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<CreateEmployeeResponse>), ApiError> {
    let created = state.directory.create(&principal, payload).await?;
    tracing::info!(
        employee_id = created.employee.id,
        account_id = created.user.id,
        "provisioned employee"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_employee
///
/// [Self-or-Admin Route] Admins may overwrite any field; the owning employee only
/// phone, address, and email (other supplied fields are ignored, not rejected).
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Updated", body = Employee),
        (status = 403, description = "Not owner or admin", body = MessageResponse),
        (status = 404, description = "No such employee", body = MessageResponse)
    )
)]
pub async fn update_employee(
    principal: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.directory.update(&principal, id, payload).await?))
}

/// delete_employee
///
/// [Admin Route] Removes the employee and cascades to the paired account.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "No such employee", body = MessageResponse)
    )
)]
pub async fn delete_employee(
    principal: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.directory.delete(&principal, id).await?;
    Ok(Json(MessageResponse::new("Employee deleted successfully")))
}

/// change_password
///
/// [Authenticated Route] Verifies the current password, then replaces the stored
/// hash. Previously issued tokens keep working until they expire.
#[utoipa::path(
    post,
    path = "/api/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Changed", body = MessageResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
        (status = 401, description = "Wrong current password", body = MessageResponse),
        (status = 404, description = "Account gone", body = MessageResponse)
    )
)]
pub async fn change_password(
    principal: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let missing = "Current password and new password are required";
    let current = required(payload.current_password, missing)?;
    let new = required(payload.new_password, missing)?;

    state.auth.change_password(&principal, &current, &new).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// change_username
///
/// [Authenticated Route] Renames the account (and mirrors the name onto the linked
/// employee record) after a password check and a uniqueness check.
#[utoipa::path(
    post,
    path = "/api/change-username",
    request_body = ChangeUsernameRequest,
    responses(
        (status = 200, description = "Changed", body = ChangeUsernameResponse),
        (status = 400, description = "Missing fields or username taken", body = MessageResponse),
        (status = 401, description = "Wrong password", body = MessageResponse),
        (status = 404, description = "Account gone", body = MessageResponse)
    )
)]
pub async fn change_username(
    principal: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangeUsernameRequest>,
) -> Result<Json<ChangeUsernameResponse>, ApiError> {
    let missing = "New username and password are required";
    let new_username = required(payload.new_username, missing)?;
    let password = required(payload.password, missing)?;

    let user = state
        .auth
        .change_username(&principal, &new_username, &password)
        .await?;
    Ok(Json(ChangeUsernameResponse {
        message: "Username changed successfully".to_string(),
        user,
    }))
}

/// get_profile
///
/// [Authenticated Route] The caller's own profile: directory record for employees,
/// contact details plus rollups for admins.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Account gone", body = MessageResponse)
    )
)]
pub async fn get_profile(
    principal: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    Ok(Json(state.directory.profile(&principal).await?))
}

/// get_admin_data
///
/// [Admin Route] Department statistics and totals over the employee collection.
/// An empty collection yields a 404 with a machine-readable error code.
#[utoipa::path(
    get,
    path = "/api/admin/data",
    responses(
        (status = 200, description = "Aggregation", body = AdminData),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "No employee data", body = MessageResponse)
    )
)]
pub async fn get_admin_data(
    principal: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminData>, ApiError> {
    Ok(Json(state.directory.summarize(&principal).await?))
}
