use crate::models::{Account, Employee, Role};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// StoreError
///
/// Failure of the persistence collaborator. Surfaced to clients as an opaque 500
/// through `ApiError::Storage`; the cause only reaches the logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt data file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Repository Trait
///
/// The abstract contract for the two flat record collections (users, employees),
/// exposing get-all / get-by-id / upsert / delete per collection. Handlers and
/// services interact with the data layer through this trait without knowing the
/// concrete implementation (JSON files in production, in-memory in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential store ---
    async fn list_users(&self) -> Result<Vec<Account>, StoreError>;
    async fn find_user(&self, id: i64) -> Result<Option<Account>, StoreError>;
    /// Inserts or replaces the account with the same id.
    async fn upsert_user(&self, account: Account) -> Result<(), StoreError>;
    /// Returns false if no account with that id existed.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    // --- Employee store ---
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn find_employee(&self, id: i64) -> Result<Option<Employee>, StoreError>;
    async fn upsert_employee(&self, employee: Employee) -> Result<(), StoreError>;
    async fn delete_employee(&self, id: i64) -> Result<bool, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// JsonFileRepository
///
/// The production implementation: two pretty-printed JSON arrays on disk
/// (`users.json`, `employees.json`). Every mutation is a whole-file
/// read-modify-write with no locking, so two concurrent writes to the same
/// collection race and the later write-back wins. That last-writer-wins weak
/// consistency is the documented behavior of this store, deliberately preserved
/// rather than upgraded to per-record locking.
pub struct JsonFileRepository {
    users_path: PathBuf,
    employees_path: PathBuf,
    data_dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            users_path: data_dir.join("users.json"),
            employees_path: data_dir.join("employees.json"),
            data_dir,
        }
    }

    /// seed
    ///
    /// Creates the data directory and, for each collection file that does not yet
    /// exist, writes the bootstrap data: two admin accounts, eight sample employees,
    /// and the paired employee accounts. Existing files are left untouched, so
    /// seeding is safe to run at every startup.
    pub async fn seed(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).await?;

        if !self.users_path.exists() {
            write_collection(&self.users_path, &seed_admins()?).await?;
            tracing::info!("seeded default admin accounts");
        }

        if !self.employees_path.exists() {
            write_collection(&self.employees_path, &seed_employees()).await?;

            // The sample employees need paired credentials; append them to whatever
            // the users file holds by now.
            let mut users: Vec<Account> = read_collection(&self.users_path).await?;
            users.extend(seed_employee_accounts()?);
            write_collection(&self.users_path, &users).await?;
            tracing::info!("seeded sample employees and their accounts");
        }

        Ok(())
    }
}

async fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        // An absent file is an empty collection, matching first-boot behavior.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(items)?;
    fs::write(path, bytes).await?;
    Ok(())
}

/// Generic whole-collection upsert: replace the record with the matching id, or
/// append if absent, then write the entire file back.
async fn upsert_record<T, F>(path: &Path, record: T, same_id: F) -> Result<(), StoreError>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let mut items: Vec<T> = read_collection(path).await?;
    match items.iter_mut().find(|item| same_id(item)) {
        Some(slot) => *slot = record,
        None => items.push(record),
    }
    write_collection(path, &items).await
}

async fn delete_record<T, F>(path: &Path, same_id: F) -> Result<bool, StoreError>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let mut items: Vec<T> = read_collection(path).await?;
    let before = items.len();
    items.retain(|item| !same_id(item));
    if items.len() == before {
        return Ok(false);
    }
    write_collection(path, &items).await?;
    Ok(true)
}

#[async_trait]
impl Repository for JsonFileRepository {
    async fn list_users(&self) -> Result<Vec<Account>, StoreError> {
        read_collection(&self.users_path).await
    }

    async fn find_user(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.list_users().await?.into_iter().find(|u| u.id == id))
    }

    async fn upsert_user(&self, account: Account) -> Result<(), StoreError> {
        let id = account.id;
        upsert_record(&self.users_path, account, |u: &Account| u.id == id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        delete_record(&self.users_path, |u: &Account| u.id == id).await
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        read_collection(&self.employees_path).await
    }

    async fn find_employee(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .list_employees()
            .await?
            .into_iter()
            .find(|e| e.id == id))
    }

    async fn upsert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        let id = employee.id;
        upsert_record(&self.employees_path, employee, |e: &Employee| e.id == id).await
    }

    async fn delete_employee(&self, id: i64) -> Result<bool, StoreError> {
        delete_record(&self.employees_path, |e: &Employee| e.id == id).await
    }
}

// --- Seed data ---
//
// Mirrors the data the application has always shipped with, so a fresh checkout
// is immediately usable: admin/admin123 plus a small directory of employees whose
// accounts all start with the default password.

fn seed_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
}

fn seed_admins() -> Result<Vec<Account>, StoreError> {
    let admins = [
        (1, "admin", "admin123", "Admin User", "admin@company.com", "555-123-0000", seed_date(2019, 1, 1)),
        (2, "sarahjohnson", "admin456", "Sarah Johnson", "sarah.johnson@company.com", "555-123-0001", seed_date(2020, 3, 15)),
    ];

    admins
        .into_iter()
        .map(|(id, username, password, name, email, phone, join_date)| {
            Ok(Account {
                id,
                username: username.to_string(),
                password_hash: bcrypt::hash(password, 10)
                    .map_err(|e| std::io::Error::other(e.to_string()))?,
                role: Role::Admin,
                employee_id: None,
                name: Some(name.to_string()),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                join_date: Some(join_date),
            })
        })
        .collect()
}

fn seed_employees() -> Vec<Employee> {
    let rows = [
        (1, "John Doe", "john.doe@example.com", "Software Developer", "Engineering", seed_date(2022, 1, 15), 85000.0, "555-123-4567", "123 Main St, Anytown, USA"),
        (2, "Jane Smith", "jane.smith@example.com", "UX Designer", "Design", seed_date(2021, 8, 10), 78000.0, "555-987-6543", "456 Oak Ave, Somewhere, USA"),
        (3, "Michael Johnson", "michael.johnson@example.com", "Project Manager", "Management", seed_date(2020, 3, 22), 95000.0, "555-456-7890", "789 Pine St, Elsewhere, USA"),
        (4, "Emily Davis", "emily.davis@example.com", "Marketing Specialist", "Marketing", seed_date(2021, 11, 5), 72000.0, "555-234-5678", "321 Cedar Rd, Nowhere, USA"),
        (5, "Robert Wilson", "robert.wilson@example.com", "Senior Developer", "Engineering", seed_date(2019, 7, 18), 110000.0, "555-876-5432", "654 Birch Ln, Anyplace, USA"),
        (6, "Lisa Brown", "lisa.brown@example.com", "HR Manager", "Human Resources", seed_date(2020, 9, 30), 88000.0, "555-345-6789", "987 Maple Dr, Somewhere, USA"),
        (7, "David Miller", "david.miller@example.com", "Financial Analyst", "Finance", seed_date(2022, 2, 14), 82000.0, "555-567-8901", "135 Walnut St, Elsewhere, USA"),
        (8, "Jennifer Taylor", "jennifer.taylor@example.com", "Content Writer", "Marketing", seed_date(2021, 6, 22), 65000.0, "555-678-9012", "246 Elm Ave, Nowhere, USA"),
    ];

    rows.into_iter()
        .map(|(id, name, email, position, department, join_date, salary, phone, address)| Employee {
            id,
            name: name.to_string(),
            email: email.to_string(),
            position: position.to_string(),
            department: department.to_string(),
            join_date,
            salary,
            phone: phone.to_string(),
            address: address.to_string(),
            // Account ids for the seed employees start after the two admins.
            user_id: Some(id + 2),
            username: None,
        })
        .collect()
}

fn seed_employee_accounts() -> Result<Vec<Account>, StoreError> {
    let rows = [
        (3, "johndoe", 1),
        (4, "janesmith", 2),
        (5, "michaelj", 3),
        (6, "emilyd", 4),
        (7, "robertw", 5),
        (8, "lisab", 6),
        (9, "davidm", 7),
        (10, "jennifert", 8),
    ];

    // All seed employees share one default password; hash it once.
    let hash =
        bcrypt::hash("password123", 10).map_err(|e| std::io::Error::other(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|(id, username, employee_id)| Account {
            id,
            username: username.to_string(),
            password_hash: hash.clone(),
            role: Role::Employee,
            employee_id: Some(employee_id),
            name: None,
            email: None,
            phone: None,
            join_date: None,
        })
        .collect())
}

/// MemoryRepository
///
/// In-memory implementation backing the test suite, mirroring the store's semantics
/// (replace-by-id upsert, delete-by-id) without touching the filesystem.
#[derive(Default)]
pub struct MemoryRepository {
    users: std::sync::RwLock<Vec<Account>>,
    employees: std::sync::RwLock<Vec<Employee>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(users: Vec<Account>, employees: Vec<Employee>) -> Self {
        Self {
            users: std::sync::RwLock::new(users),
            employees: std::sync::RwLock::new(employees),
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_users(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.users.read().unwrap().clone())
    }

    async fn find_user(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.users.read().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_user(&self, account: Account) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap();
        match users.iter_mut().find(|u| u.id == account.id) {
            Some(slot) => *slot = account,
            None => users.push(account),
        }
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut users = self.users.write().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.employees.read().unwrap().clone())
    }

    async fn find_employee(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .read()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn upsert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        let mut employees = self.employees.write().unwrap();
        match employees.iter_mut().find(|e| e.id == employee.id) {
            Some(slot) => *slot = employee,
            None => employees.push(employee),
        }
        Ok(())
    }

    async fn delete_employee(&self, id: i64) -> Result<bool, StoreError> {
        let mut employees = self.employees.write().unwrap();
        let before = employees.len();
        employees.retain(|e| e.id != id);
        Ok(employees.len() != before)
    }
}
