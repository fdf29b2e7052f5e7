use std::env;
use std::path::PathBuf;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all threads and services.
/// It is pulled into the application state via FromRef, embodying the "immutable AppConfig"
/// part of the Unified State Pattern.
///
/// The token signing secret and TTL live here and are threaded into the Auth Service
/// at construction; no service reads them from ambient global state.
#[derive(Clone)]
pub struct AppConfig {
    // Directory holding the flat JSON collections (users.json, employees.json).
    pub data_dir: PathBuf,
    // Secret key used to sign and validate bearer tokens.
    pub jwt_secret: String,
    // Lifetime of an issued token, in hours.
    pub token_ttl_hours: i64,
    // Password assigned to accounts provisioned alongside a new employee.
    pub default_password: String,
    // TCP port the HTTP server binds to.
    pub port: u16,
    // Runtime environment marker. Controls the log output format.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between human-readable local logging
/// and structured JSON logging for production log aggregation.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows us to instantiate the configuration without needing to set environment
    /// variables for lightweight unit or integration testing state scaffolding.
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            jwt_secret: "test-secret-value-local-only".to_string(),
            token_ttl_hours: 24,
            default_password: "password123".to_string(),
            port: 5000,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime
    /// environment (especially Production) is not found, or if a numeric variable does
    /// not parse. This prevents the application from starting with an incomplete or
    /// insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The production signing secret is mandatory and must be explicitly set.
        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            _ => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "local-dev-secret-do-not-use-in-prod".to_string()),
        };

        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .map(|v| {
                v.parse::<i64>()
                    .expect("FATAL: TOKEN_TTL_HOURS must be an integer")
            })
            .unwrap_or(24);

        let port = env::var("PORT")
            .ok()
            .map(|v| v.parse::<u16>().expect("FATAL: PORT must be a valid port"))
            .unwrap_or(5000);

        Self {
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
            jwt_secret,
            token_ttl_hours,
            default_password: env::var("DEFAULT_EMPLOYEE_PASSWORD")
                .unwrap_or_else(|_| "password123".to_string()),
            port,
            env,
        }
    }
}
