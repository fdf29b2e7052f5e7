use crate::{auth::AuthUser, models::Role};

/// Operation
///
/// Every resource operation the policy can be asked about. Tagging lives in
/// [`Operation::admin_only`]: the admin-only set requires the admin role outright,
/// while the remaining (self-or-admin) set also admits the owning employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListEmployees,
    ReadEmployee,
    CreateEmployee,
    UpdateEmployee,
    DeleteEmployee,
    AdminData,
}

impl Operation {
    pub fn admin_only(self) -> bool {
        matches!(
            self,
            Operation::ListEmployees
                | Operation::CreateEmployee
                | Operation::DeleteEmployee
                | Operation::AdminData
        )
    }
}

/// decide
///
/// Pure authorization decision: given the authenticated principal, the requested
/// operation, and (for self-or-admin operations) the employee id that owns the
/// resource, returns whether the operation is allowed. No side effects, no I/O.
///
/// Rules, in priority order:
/// 1. A valid principal is a precondition (enforced upstream by the extractor).
/// 2. Admin-only operations require `role == Admin`.
/// 3. Self-or-admin operations allow admins, or an employee whose own
///    `employee_id` matches the resource owner.
/// 4. Everything else denies.
pub fn decide(principal: &AuthUser, operation: Operation, resource_owner: Option<i64>) -> bool {
    if principal.role == Role::Admin {
        return true;
    }

    if operation.admin_only() {
        return false;
    }

    match operation {
        Operation::ReadEmployee | Operation::UpdateEmployee => {
            principal.employee_id.is_some() && principal.employee_id == resource_owner
        }
        // Unreachable given admin_only() above, but deny-by-default regardless.
        _ => false,
    }
}
