use chrono::NaiveDate;
use staff_api::{
    MemoryRepository,
    auth::{AuthUser, verify_password},
    config::AppConfig,
    directory::DirectoryService,
    error::ApiError,
    models::{Account, CreateEmployeeRequest, Employee, Role, UpdateEmployeeRequest},
    repository::{Repository, RepositoryState},
};
use std::sync::Arc;

fn admin() -> AuthUser {
    AuthUser {
        id: 1,
        username: "admin".to_string(),
        role: Role::Admin,
        employee_id: None,
    }
}

fn owner(employee_id: i64) -> AuthUser {
    AuthUser {
        id: 100 + employee_id,
        username: format!("owner{employee_id}"),
        role: Role::Employee,
        employee_id: Some(employee_id),
    }
}

fn employee(id: i64, department: &str, salary: f64) -> Employee {
    Employee {
        id,
        name: format!("Employee {id}"),
        email: format!("employee{id}@example.com"),
        position: "Engineer".to_string(),
        department: department.to_string(),
        join_date: NaiveDate::from_ymd_opt(2022, 1, 15).unwrap(),
        salary,
        phone: "555-000-0000".to_string(),
        address: "1 Test St".to_string(),
        user_id: Some(100 + id),
        username: None,
    }
}

fn paired_account(employee_id: i64) -> Account {
    Account {
        id: 100 + employee_id,
        username: format!("owner{employee_id}"),
        password_hash: "$2b$10$invalidhashfortestingonly".to_string(),
        role: Role::Employee,
        employee_id: Some(employee_id),
        ..Account::default()
    }
}

fn setup(users: Vec<Account>, employees: Vec<Employee>) -> (DirectoryService, RepositoryState) {
    let repo: RepositoryState = Arc::new(MemoryRepository::with_data(users, employees));
    (
        DirectoryService::new(repo.clone(), &AppConfig::default()),
        repo,
    )
}

fn create_request() -> CreateEmployeeRequest {
    CreateEmployeeRequest {
        name: "New Hire".to_string(),
        email: "new.hire@example.com".to_string(),
        position: "Analyst".to_string(),
        department: "Finance".to_string(),
        join_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        salary: 70000.0,
        phone: Some("555-111-2222".to_string()),
        address: Some("2 New St".to_string()),
    }
}

// --- Listing and reads ---

#[tokio::test]
async fn list_requires_admin() {
    let (directory, _) = setup(vec![], vec![employee(1, "Engineering", 85000.0)]);

    let err = directory.list_all(&owner(1)).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let all = directory.list_all(&admin()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn owner_reads_own_record_but_not_others() {
    let employees = vec![
        employee(1, "Engineering", 85000.0),
        employee(2, "Design", 78000.0),
    ];
    let (directory, _) = setup(vec![], employees);

    let own = directory.get_by_id(&owner(1), 1).await.unwrap();
    assert_eq!(own.id, 1);

    let err = directory.get_by_id(&owner(1), 2).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn read_of_missing_record_is_not_found_even_for_admin() {
    let (directory, _) = setup(vec![], vec![]);

    let err = directory.get_by_id(&admin(), 42).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// --- Provisioning ---

#[tokio::test]
async fn create_provisions_employee_and_paired_account() {
    let (directory, repo) = setup(
        vec![paired_account(1)],
        vec![employee(1, "Engineering", 85000.0)],
    );

    let created = directory.create(&admin(), create_request()).await.unwrap();

    // Employee id is one past the current maximum; account id likewise.
    assert_eq!(created.employee.id, 2);
    assert_eq!(created.employee.user_id, Some(102));
    assert_eq!(created.user.id, 102);

    // Username derives from the email local part; password is the configured default.
    assert_eq!(created.user.username, "new.hire");
    assert_eq!(created.user.role, Role::Employee);
    assert_eq!(created.user.default_password, "password123");

    let account = repo.find_user(102).await.unwrap().unwrap();
    assert_eq!(account.role, Role::Employee);
    assert_eq!(account.employee_id, Some(2));
    assert!(verify_password("password123", &account.password_hash));
}

#[tokio::test]
async fn create_ids_start_at_one_on_empty_stores() {
    let (directory, _) = setup(vec![], vec![]);

    let created = directory.create(&admin(), create_request()).await.unwrap();
    assert_eq!(created.employee.id, 1);
    assert_eq!(created.user.id, 1);
}

#[tokio::test]
async fn create_with_negative_salary_persists_nothing() {
    let (directory, repo) = setup(vec![], vec![]);

    let err = directory
        .create(
            &admin(),
            CreateEmployeeRequest {
                salary: -5.0,
                ..create_request()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    assert!(repo.list_employees().await.unwrap().is_empty());
    assert!(repo.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_blank_required_fields_and_bad_email() {
    let (directory, _) = setup(vec![], vec![]);

    for req in [
        CreateEmployeeRequest {
            name: "  ".to_string(),
            ..create_request()
        },
        CreateEmployeeRequest {
            department: String::new(),
            ..create_request()
        },
        CreateEmployeeRequest {
            email: "not-an-email".to_string(),
            ..create_request()
        },
        CreateEmployeeRequest {
            email: "no-domain@".to_string(),
            ..create_request()
        },
    ] {
        let err = directory.create(&admin(), req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}

#[tokio::test]
async fn create_requires_admin() {
    let (directory, repo) = setup(vec![], vec![employee(1, "Engineering", 85000.0)]);

    let err = directory.create(&owner(1), create_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(repo.list_employees().await.unwrap().len(), 1);
}

// --- Updates ---

#[tokio::test]
async fn owner_update_applies_only_contact_fields() {
    let (directory, _) = setup(vec![], vec![employee(1, "Engineering", 85000.0)]);

    let updated = directory
        .update(
            &owner(1),
            1,
            UpdateEmployeeRequest {
                salary: Some(999999.0),
                phone: Some("555-0000".to_string()),
                ..UpdateEmployeeRequest::default()
            },
        )
        .await
        .unwrap();

    // Only the phone changed; the salary field was silently ignored.
    assert_eq!(updated.phone, "555-0000");
    assert_eq!(updated.salary, 85000.0);
}

#[tokio::test]
async fn admin_update_overwrites_all_supplied_fields() {
    let (directory, _) = setup(vec![], vec![employee(1, "Engineering", 85000.0)]);

    let updated = directory
        .update(
            &admin(),
            1,
            UpdateEmployeeRequest {
                salary: Some(90000.0),
                position: Some("Staff Engineer".to_string()),
                department: Some("Platform".to_string()),
                ..UpdateEmployeeRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, 1);
    assert_eq!(updated.salary, 90000.0);
    assert_eq!(updated.position, "Staff Engineer");
    assert_eq!(updated.department, "Platform");
    // Unsupplied fields survive.
    assert_eq!(updated.name, "Employee 1");
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let (directory, _) = setup(vec![], vec![]);

    let err = directory
        .update(&admin(), 9, UpdateEmployeeRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn update_by_non_owner_is_forbidden_and_persists_nothing() {
    let (directory, repo) = setup(vec![], vec![employee(2, "Design", 78000.0)]);

    let err = directory
        .update(
            &owner(1),
            2,
            UpdateEmployeeRequest {
                phone: Some("555-9999".to_string()),
                ..UpdateEmployeeRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let stored = repo.find_employee(2).await.unwrap().unwrap();
    assert_eq!(stored.phone, "555-000-0000");
}

// --- Deletion and cascade ---

#[tokio::test]
async fn delete_cascades_to_paired_account() {
    let (directory, repo) = setup(
        vec![paired_account(1)],
        vec![employee(1, "Engineering", 85000.0)],
    );

    directory.delete(&admin(), 1).await.unwrap();

    assert!(repo.find_employee(1).await.unwrap().is_none());
    assert!(repo.find_user(101).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_without_paired_account_succeeds() {
    let (directory, repo) = setup(vec![], vec![employee(1, "Engineering", 85000.0)]);

    directory.delete(&admin(), 1).await.unwrap();
    assert!(repo.find_employee(1).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_requires_admin() {
    let (directory, repo) = setup(
        vec![paired_account(1)],
        vec![employee(1, "Engineering", 85000.0)],
    );

    // Even the owning employee may not delete their own record.
    let err = directory.delete(&owner(1), 1).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert!(repo.find_employee(1).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_of_missing_record_is_not_found() {
    let (directory, _) = setup(vec![], vec![]);

    let err = directory.delete(&admin(), 77).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// --- Aggregation ---

#[tokio::test]
async fn summarize_groups_by_department() {
    let employees = vec![
        employee(1, "Engineering", 80000.0),
        employee(2, "Engineering", 100000.0),
        employee(3, "Design", 78000.0),
    ];
    let (directory, _) = setup(vec![], employees);

    let data = directory.summarize(&admin()).await.unwrap();

    assert_eq!(data.total_employees, 3);
    assert_eq!(data.total_departments, 2);
    assert_eq!(data.total_salary, 258000.0);
    assert_eq!(data.employees.len(), 3);

    let engineering = data
        .departments
        .iter()
        .find(|d| d.name == "Engineering")
        .unwrap();
    assert_eq!(engineering.count, 2);
    assert_eq!(engineering.avg_salary, 90000.0);

    let design = data.departments.iter().find(|d| d.name == "Design").unwrap();
    assert_eq!(design.count, 1);
    assert_eq!(design.avg_salary, 78000.0);
}

#[tokio::test]
async fn summarize_requires_admin() {
    let (directory, _) = setup(vec![], vec![employee(1, "Engineering", 85000.0)]);

    let err = directory.summarize(&owner(1)).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn summarize_on_empty_collection_reports_no_data() {
    let (directory, _) = setup(vec![], vec![]);

    let err = directory.summarize(&admin()).await.unwrap_err();
    match err {
        ApiError::NoData { code, .. } => assert_eq!(code, "DATA_NOT_FOUND"),
        other => panic!("expected NoData, got {other:?}"),
    }
}

// --- Profile ---

#[tokio::test]
async fn employee_profile_includes_directory_record() {
    let (directory, _) = setup(
        vec![paired_account(1)],
        vec![employee(1, "Engineering", 85000.0)],
    );

    let profile = directory.profile(&owner(1)).await.unwrap();
    assert_eq!(profile.user.id, 101);
    assert!(profile.admin_profile.is_none());
    assert_eq!(profile.employee.unwrap().id, 1);
}

#[tokio::test]
async fn admin_profile_carries_rollups() {
    let admin_account = Account {
        id: 1,
        username: "admin".to_string(),
        password_hash: "$2b$10$invalidhashfortestingonly".to_string(),
        role: Role::Admin,
        name: Some("Admin User".to_string()),
        email: Some("admin@company.com".to_string()),
        ..Account::default()
    };
    let employees = vec![
        employee(1, "Engineering", 80000.0),
        employee(2, "Design", 78000.0),
    ];
    let (directory, _) = setup(vec![admin_account], employees);

    let profile = directory.profile(&admin()).await.unwrap();
    assert!(profile.employee.is_none());

    let details = profile.admin_profile.unwrap();
    assert_eq!(details.managed_employees, 2);
    assert_eq!(details.managed_departments, 2);
    assert_eq!(details.total_budget, 158000.0);
    assert_eq!(details.position, "Administrator");
}

#[tokio::test]
async fn profile_for_deleted_account_is_not_found() {
    let (directory, _) = setup(vec![], vec![]);

    let err = directory.profile(&admin()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
