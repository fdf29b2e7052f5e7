use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{Account, Role, UserSummary},
    repository::RepositoryState,
};

/// Claims
///
/// The payload signed into every bearer token: a snapshot of the principal at
/// issuance time plus the standard `iat`/`exp` timestamps. Validity is stateless —
/// signature and expiry are all that is checked — so a token keeps working until it
/// expires even if the account mutates (a password change does not revoke it).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    /// Issued At: timestamp when the token was signed.
    pub iat: usize,
    /// Expiration Time: timestamp after which the token must not be accepted.
    pub exp: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request — the Principal. Reconstructed
/// entirely from the validated token payload on every request; the extractor never
/// touches the credential store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub employee_id: Option<i64>,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. This cleanly separates authentication
/// (extractor) from business logic (the handler).
///
/// Process: pull the signing secret from AppConfig via the application state,
/// extract the `Authorization: Bearer` header, decode and validate the token.
///
/// Rejection: 401 Unauthorized on a missing, malformed, signature-invalid, or
/// expired token.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated("Authentication token required"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated("Authentication token required"))?;

        decode_token(token, &config.jwt_secret)
    }
}

/// decode_token
///
/// Validates signature and expiry against the given secret and reconstructs the
/// Principal from the claims. All decode failures collapse into the same 401; the
/// caller learns nothing about why the token was rejected.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, ApiError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|_| ApiError::Unauthenticated("Invalid or expired token"))?;

    let claims = token_data.claims;
    Ok(AuthUser {
        id: claims.id,
        username: claims.username,
        role: claims.role,
        employee_id: claims.employee_id,
    })
}

/// hash_password
///
/// One-way salted hash. Cost 10 matches the hashes already present in the data files.
/// Deliberately expensive; callers must not assume it completes instantly.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    Ok(bcrypt::hash(password, 10)?)
}

/// verify_password
///
/// Constant-structure verification through the hashing scheme — never a plaintext
/// comparison. An unparseable stored hash counts as a failed verification.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// AuthService
///
/// Credential verification, token issuance, and credential mutation. The signing
/// secret and token TTL are threaded in at construction from AppConfig; issuance is
/// stateless (nothing is persisted when a token is signed).
#[derive(Clone)]
pub struct AuthService {
    repo: RepositoryState,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(repo: RepositoryState, config: &AppConfig) -> Self {
        Self {
            repo,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_hours: config.token_ttl_hours,
        }
    }

    /// authenticate
    ///
    /// Case-sensitive username lookup followed by bcrypt verification. Unknown
    /// username and wrong password produce the identical error, so the response
    /// does not leak which accounts exist.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, UserSummary), ApiError> {
        let users = self.repo.list_users().await?;
        let account = users
            .iter()
            .find(|u| u.username == username)
            .ok_or(ApiError::InvalidCredentials("Invalid username or password"))?;

        if !verify_password(password, &account.password_hash) {
            return Err(ApiError::InvalidCredentials("Invalid username or password"));
        }

        let token = self.issue_token(account)?;
        Ok((token, UserSummary::from(account)))
    }

    /// issue_token
    ///
    /// Signs a Principal snapshot with the configured secret and TTL.
    pub fn issue_token(&self, account: &Account) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
            employee_id: account.employee_id,
            iat: now as usize,
            exp: (now + self.token_ttl_hours * 3600) as usize,
        };

        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &key)?)
    }

    /// change_password
    ///
    /// Verifies the current password before atomically replacing the stored hash
    /// with a freshly salted one. No server-side strength policy: any non-empty new
    /// password is accepted (the ≥6-character rule lives in the client — a known
    /// latent gap, kept as-is). Outstanding tokens remain valid until expiry.
    pub async fn change_password(
        &self,
        principal: &AuthUser,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let mut account = self
            .repo
            .find_user(principal.id)
            .await?
            .ok_or(ApiError::NotFound("User not found"))?;

        if !verify_password(current_password, &account.password_hash) {
            return Err(ApiError::InvalidCredentials("Current password is incorrect"));
        }

        account.password_hash = hash_password(new_password)?;
        self.repo.upsert_user(account).await?;
        Ok(())
    }

    /// change_username
    ///
    /// Rejects the new name if any other account already holds it (case-sensitive),
    /// verifies the password, then updates the account. Employee-role accounts also
    /// get the username mirrored onto their linked employee record — a denormalized
    /// convenience field with no independent source of truth.
    pub async fn change_username(
        &self,
        principal: &AuthUser,
        new_username: &str,
        password: &str,
    ) -> Result<UserSummary, ApiError> {
        let users = self.repo.list_users().await?;

        let mut account = users
            .iter()
            .find(|u| u.id == principal.id)
            .cloned()
            .ok_or(ApiError::NotFound("User not found"))?;

        if users
            .iter()
            .any(|u| u.username == new_username && u.id != principal.id)
        {
            return Err(ApiError::Conflict("Username already taken"));
        }

        if !verify_password(password, &account.password_hash) {
            return Err(ApiError::InvalidCredentials("Password is incorrect"));
        }

        account.username = new_username.to_string();
        self.repo.upsert_user(account.clone()).await?;

        if account.role == Role::Employee {
            if let Some(employee_id) = account.employee_id {
                if let Some(mut employee) = self.repo.find_employee(employee_id).await? {
                    employee.username = Some(new_username.to_string());
                    self.repo.upsert_employee(employee).await?;
                }
            }
        }

        Ok(UserSummary::from(&account))
    }
}
