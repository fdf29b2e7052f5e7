use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to the JSON collections) ---

/// Role
///
/// The RBAC field carried by every account and token. Serialized in lowercase on the
/// wire and in the data files ("admin" / "employee").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

/// Account
///
/// A credential record from `users.json`. The stored password is a one-way salted
/// bcrypt hash; the wire name stays `password` for compatibility with the existing
/// data files. This struct never leaves the server — responses use [`UserSummary`].
///
/// Invariants: usernames are unique across the collection; an employee-role account
/// references exactly one employee via `employee_id`; admin accounts never do.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: Role,
    /// Present iff `role == Employee`. A lookup relation, not ownership: deleting the
    /// referenced employee cascades to this account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    // Seeded admin accounts carry contact details used by the profile endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

/// Employee
///
/// A directory record from `employees.json`. Owned independently of accounts;
/// `user_id` is the back-reference written at provisioning time and `username` is a
/// denormalized mirror maintained by the change-username flow (no independent source
/// of truth).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    #[ts(type = "string")]
    pub join_date: NaiveDate,
    pub salary: f64,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// UserSummary
///
/// The client-safe projection of an account: everything except the password hash.
/// Returned by login, change-username, and inside provisioning responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
}

impl From<&Account> for UserSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
            employee_id: account.employee_id,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Both fields are optional at the serde level so the handler can report a 400 with a
/// message when one is missing, instead of a deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChangeUsernameRequest {
    pub new_username: Option<String>,
    pub password: Option<String>,
}

/// CreateEmployeeRequest
///
/// Input payload for admin-initiated provisioning (POST /api/employees).
/// All fields default so that missing ones surface as validation errors (400) rather
/// than serde rejections. A missing join date falls back to the provisioning date.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    #[ts(type = "string | null")]
    pub join_date: Option<NaiveDate>,
    pub salary: f64,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// UpdateEmployeeRequest
///
/// Partial update payload (PUT /api/employees/{id}). Only `Some` fields are applied;
/// for non-admin callers everything outside {phone, address, email} is silently
/// ignored, never rejected.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UpdateEmployeeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub join_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// --- Response Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangeUsernameResponse {
    pub message: String,
    pub user: UserSummary,
}

/// ProvisionedAccount
///
/// Summary of the account created alongside a new employee. The default password is
/// echoed back exactly once so the admin can hand it to the new hire.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProvisionedAccount {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub default_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateEmployeeResponse {
    pub employee: Employee,
    pub user: ProvisionedAccount,
}

/// DepartmentStats
///
/// Per-department rollup for the admin dashboard. Groups are derived from existing
/// employees, so they are never empty and the mean is always well defined.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DepartmentStats {
    pub name: String,
    pub count: i64,
    pub avg_salary: f64,
}

/// AdminData
///
/// Aggregation payload for GET /api/admin/data.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminData {
    pub employees: Vec<Employee>,
    pub departments: Vec<DepartmentStats>,
    pub total_salary: f64,
    pub total_employees: i64,
    pub total_departments: i64,
}

/// ProfileUser
///
/// The `user` object inside a profile response; admins additionally get their seeded
/// display name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// AdminProfile
///
/// Admin-facing profile detail: seeded contact fields plus live rollups over the
/// employee collection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub join_date: Option<NaiveDate>,
    pub managed_employees: i64,
    pub managed_departments: i64,
    pub total_budget: f64,
}

/// ProfileResponse
///
/// GET /api/profile: `{user, employee}` for employee principals, `{user, adminProfile}`
/// for admins, bare `{user}` when an employee account has no resolvable record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileResponse {
    pub user: ProfileUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Employee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_profile: Option<AdminProfile>,
}
