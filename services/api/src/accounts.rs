//! services/api/src/accounts.rs
//!
//! Registration and credential checks on top of the `UserStore` port.
//! Passwords are hashed with Argon2 (random salt, PHC string format) and
//! verified with Argon2's constant-time comparison.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use diabetes_core::domain::{NewUser, User, UserCredentials};
use diabetes_core::ports::{PortError, UserStore};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("required field '{0}' is missing")]
    Validation(&'static str),
    #[error("a user with this email or user ID already exists")]
    DuplicateIdentity,
    #[error("no user with handle '{0}'")]
    UnknownHandle(String),
    #[error("password does not match")]
    WrongPassword,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("credential store failure: {0}")]
    Storage(PortError),
}

/// Raw registration input, as submitted.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
    pub handle: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Validates the input, hashes the password and inserts the user.
    pub async fn register(&self, registration: Registration) -> Result<User, AccountError> {
        let name = required("name", &registration.name)?;
        let email = required("email", &registration.email)?;
        let handle = required("user_id", &registration.handle)?;
        if registration.password.is_empty() {
            return Err(AccountError::Validation("password"));
        }
        let contact = registration
            .contact
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let new_user = NewUser {
            name,
            email,
            contact,
            handle,
            password_hash: hash_password(&registration.password)?,
        };

        self.users.create_user(&new_user).await.map_err(|e| match e {
            PortError::Conflict(_) => AccountError::DuplicateIdentity,
            other => AccountError::Storage(other),
        })
    }

    /// Looks the handle up and checks the password against the stored hash.
    /// Unknown handles still pay for a full Argon2 verification, so response
    /// time does not reveal whether a handle exists.
    pub async fn login(&self, handle: &str, password: &str) -> Result<UserCredentials, AccountError> {
        let handle = handle.trim();
        if handle.is_empty() {
            check_password(password, None)?;
            return Err(AccountError::UnknownHandle(String::new()));
        }

        let credentials = match self.users.get_user_by_handle(handle).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => {
                check_password(password, None)?;
                return Err(AccountError::UnknownHandle(handle.to_string()));
            }
            Err(other) => return Err(AccountError::Storage(other)),
        };

        if check_password(password, Some(&credentials.password_hash))? {
            Ok(credentials)
        } else {
            Err(AccountError::WrongPassword)
        }
    }
}

/// A well-formed hash with `Argon2::default()` parameters that no password matches.
/// Verifying against it costs the same as verifying a real user's hash.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Verifies against `stored`, or against `DUMMY_HASH` when there is no user.
/// The dummy path always reports a mismatch.
fn check_password(password: &str, stored: Option<&str>) -> Result<bool, AccountError> {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => verify_password(password, DUMMY_HASH).map(|_| false),
    }
}

fn required(field: &'static str, value: &str) -> Result<String, AccountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccountError::Validation(field));
    }
    Ok(value.to_string())
}

pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AccountError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
