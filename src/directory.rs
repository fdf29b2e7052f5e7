use crate::{
    auth::{self, AuthUser},
    config::AppConfig,
    error::ApiError,
    models::{
        Account, AdminData, AdminProfile, CreateEmployeeRequest, CreateEmployeeResponse,
        DepartmentStats, Employee, ProfileResponse, ProfileUser, ProvisionedAccount, Role,
        UpdateEmployeeRequest,
    },
    policy::{self, Operation},
    repository::RepositoryState,
};

/// DirectoryService
///
/// Employee CRUD plus the admin aggregation, with the authorization policy consulted
/// before every read or write. Creating an employee also provisions the paired
/// credential record.
#[derive(Clone)]
pub struct DirectoryService {
    repo: RepositoryState,
    default_password: String,
}

impl DirectoryService {
    pub fn new(repo: RepositoryState, config: &AppConfig) -> Self {
        Self {
            repo,
            default_password: config.default_password.clone(),
        }
    }

    /// Admin-only listing of every employee record.
    pub async fn list_all(&self, principal: &AuthUser) -> Result<Vec<Employee>, ApiError> {
        if !policy::decide(principal, Operation::ListEmployees, None) {
            return Err(ApiError::Forbidden(
                "Access denied: Insufficient permissions",
            ));
        }
        Ok(self.repo.list_employees().await?)
    }

    /// Self-or-admin read. The record is looked up first so its id can serve as the
    /// resource owner in the policy check; an absent record is 404 regardless of role.
    pub async fn get_by_id(&self, principal: &AuthUser, id: i64) -> Result<Employee, ApiError> {
        let employee = self
            .repo
            .find_employee(id)
            .await?
            .ok_or(ApiError::NotFound("Employee not found"))?;

        if !policy::decide(principal, Operation::ReadEmployee, Some(employee.id)) {
            return Err(ApiError::Forbidden("Access denied"));
        }
        Ok(employee)
    }

    /// create
    ///
    /// Admin-only provisioning: validates the payload, assigns the next employee and
    /// account ids, derives the default username from the email local part, and
    /// writes the employee record plus its paired employee-role account.
    ///
    /// The two writes are sequential with no transaction around them; if the second
    /// fails the first may persist. The derived username is also not checked against
    /// existing accounts. Both behaviors are long-standing and kept as-is.
    pub async fn create(
        &self,
        principal: &AuthUser,
        req: CreateEmployeeRequest,
    ) -> Result<CreateEmployeeResponse, ApiError> {
        if !policy::decide(principal, Operation::CreateEmployee, None) {
            return Err(ApiError::Forbidden(
                "Access denied: Insufficient permissions",
            ));
        }

        validate_new_employee(&req)?;

        let employees = self.repo.list_employees().await?;
        let users = self.repo.list_users().await?;

        let employee_id = employees.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let user_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;

        // Default username: the part of the email before '@'.
        let username = req
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();

        let employee = Employee {
            id: employee_id,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            position: req.position.trim().to_string(),
            department: req.department.trim().to_string(),
            join_date: req
                .join_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
            salary: req.salary,
            phone: req.phone.unwrap_or_default(),
            address: req.address.unwrap_or_default(),
            user_id: Some(user_id),
            username: None,
        };

        let account = Account {
            id: user_id,
            username: username.clone(),
            password_hash: auth::hash_password(&self.default_password)?,
            role: Role::Employee,
            employee_id: Some(employee_id),
            name: None,
            email: None,
            phone: None,
            join_date: None,
        };

        self.repo.upsert_employee(employee.clone()).await?;
        self.repo.upsert_user(account).await?;

        Ok(CreateEmployeeResponse {
            employee,
            user: ProvisionedAccount {
                id: user_id,
                username,
                role: Role::Employee,
                default_password: self.default_password.clone(),
            },
        })
    }

    /// update
    ///
    /// Self-or-admin. Admins overwrite every supplied field (the id is immutable and
    /// never taken from the payload); the owning employee may only change phone,
    /// address, and email — other supplied fields are silently ignored.
    pub async fn update(
        &self,
        principal: &AuthUser,
        id: i64,
        req: UpdateEmployeeRequest,
    ) -> Result<Employee, ApiError> {
        let mut employee = self
            .repo
            .find_employee(id)
            .await?
            .ok_or(ApiError::NotFound("Employee not found"))?;

        if !policy::decide(principal, Operation::UpdateEmployee, Some(employee.id)) {
            return Err(ApiError::Forbidden("Access denied"));
        }

        if let Some(email) = req.email {
            employee.email = email;
        }
        if let Some(phone) = req.phone {
            employee.phone = phone;
        }
        if let Some(address) = req.address {
            employee.address = address;
        }

        if principal.role == Role::Admin {
            if let Some(name) = req.name {
                employee.name = name;
            }
            if let Some(position) = req.position {
                employee.position = position;
            }
            if let Some(department) = req.department {
                employee.department = department;
            }
            if let Some(join_date) = req.join_date {
                employee.join_date = join_date;
            }
            if let Some(salary) = req.salary {
                employee.salary = salary;
            }
        }

        self.repo.upsert_employee(employee.clone()).await?;
        Ok(employee)
    }

    /// delete
    ///
    /// Admin-only. Removes the employee and cascades to the account whose
    /// `employee_id` references it; a missing paired account is not an error.
    pub async fn delete(&self, principal: &AuthUser, id: i64) -> Result<(), ApiError> {
        if !policy::decide(principal, Operation::DeleteEmployee, None) {
            return Err(ApiError::Forbidden(
                "Access denied: Insufficient permissions",
            ));
        }

        if !self.repo.delete_employee(id).await? {
            return Err(ApiError::NotFound("Employee not found"));
        }

        let paired = self
            .repo
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.employee_id == Some(id));
        if let Some(account) = paired {
            self.repo.delete_user(account.id).await?;
            tracing::info!(employee_id = id, account_id = account.id, "cascade-deleted paired account");
        }

        Ok(())
    }

    /// summarize
    ///
    /// Admin-only rollup: per-department counts and mean salaries over the whole
    /// employee collection, plus totals. An empty collection is a reportable
    /// condition with its own error code, distinct from a server failure.
    pub async fn summarize(&self, principal: &AuthUser) -> Result<AdminData, ApiError> {
        if !policy::decide(principal, Operation::AdminData, None) {
            return Err(ApiError::Forbidden(
                "Access denied: Insufficient permissions",
            ));
        }

        let employees = self.repo.list_employees().await?;
        if employees.is_empty() {
            return Err(ApiError::NoData {
                message: "No employee data available".to_string(),
                code: "DATA_NOT_FOUND",
            });
        }

        Ok(aggregate(employees))
    }

    /// profile
    ///
    /// Any authenticated principal. Employees get their directory record; admins get
    /// their seeded contact details plus live rollups over the collection.
    pub async fn profile(&self, principal: &AuthUser) -> Result<ProfileResponse, ApiError> {
        let account = self
            .repo
            .find_user(principal.id)
            .await?
            .ok_or(ApiError::NotFound("User not found"))?;

        if account.role == Role::Admin {
            let employees = self.repo.list_employees().await?;
            let total_salary: f64 = employees.iter().map(|e| e.salary).sum();
            let departments = department_names(&employees);

            let name = account.name.clone().unwrap_or_else(|| "Admin User".to_string());
            return Ok(ProfileResponse {
                user: ProfileUser {
                    id: account.id,
                    username: account.username.clone(),
                    role: account.role,
                    name: Some(name.clone()),
                },
                employee: None,
                admin_profile: Some(AdminProfile {
                    id: account.id,
                    name,
                    email: account.email.unwrap_or_else(|| "admin@example.com".to_string()),
                    phone: account.phone.unwrap_or_else(|| "555-ADMIN".to_string()),
                    position: "Administrator".to_string(),
                    department: "Management".to_string(),
                    join_date: account.join_date,
                    managed_employees: employees.len() as i64,
                    managed_departments: departments.len() as i64,
                    total_budget: total_salary,
                }),
            });
        }

        let employee = match account.employee_id {
            Some(employee_id) => self.repo.find_employee(employee_id).await?,
            None => None,
        };

        Ok(ProfileResponse {
            user: ProfileUser {
                id: account.id,
                username: account.username,
                role: account.role,
                name: None,
            },
            employee,
            admin_profile: None,
        })
    }
}

/// Grouping key is the exact department string; first-seen order is preserved.
fn department_names(employees: &[Employee]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for employee in employees {
        if !names.contains(&employee.department) {
            names.push(employee.department.clone());
        }
    }
    names
}

fn aggregate(employees: Vec<Employee>) -> AdminData {
    let mut departments: Vec<DepartmentStats> = Vec::new();
    for employee in &employees {
        match departments.iter_mut().find(|d| d.name == employee.department) {
            Some(stats) => {
                // avg_salary carries the running sum until the final pass below.
                stats.count += 1;
                stats.avg_salary += employee.salary;
            }
            None => departments.push(DepartmentStats {
                name: employee.department.clone(),
                count: 1,
                avg_salary: employee.salary,
            }),
        }
    }
    for stats in &mut departments {
        stats.avg_salary /= stats.count as f64;
    }

    let total_salary: f64 = employees.iter().map(|e| e.salary).sum();
    let total_employees = employees.len() as i64;
    let total_departments = departments.len() as i64;

    AdminData {
        employees,
        departments,
        total_salary,
        total_employees,
        total_departments,
    }
}

/// validate_new_employee
///
/// Required fields non-empty, plausible email shape, positive salary. Runs before
/// any id assignment or write, so a rejected request persists nothing.
fn validate_new_employee(req: &CreateEmployeeRequest) -> Result<(), ApiError> {
    for (value, field) in [
        (&req.name, "name"),
        (&req.email, "email"),
        (&req.position, "position"),
        (&req.department, "department"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("Field '{field}' is required")));
        }
    }

    if !valid_email(req.email.trim()) {
        return Err(ApiError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    if !(req.salary > 0.0) {
        return Err(ApiError::Validation(
            "Salary must be a positive number".to_string(),
        ));
    }

    Ok(())
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
