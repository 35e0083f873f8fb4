//! User record store.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → NewUser / UserPatch (presence checks)
//!     → UserRepository (trait object held in AppState)
//!         → memory.rs   (DashMap, no database configured)
//!         → postgres.rs (sqlx PgPool)
//!     → UserRecord
//! ```
//!
//! # Design Decisions
//! - The store assigns ids; callers never choose or change them
//! - Updating or deleting an unknown id is an error, never a silent no-op
//! - Adapters map their own failures onto `StoreError`

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Fields for a registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Trim both fields and check they are present and within length.
    pub fn validate(self) -> Result<Self, StoreError> {
        Ok(Self {
            name: required("name", &self.name, MAX_NAME_LEN)?,
            email: required("email", &self.email, MAX_EMAIL_LEN)?,
        })
    }
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserPatch {
    pub fn validate(self) -> Result<Self, StoreError> {
        if self.name.is_none() && self.email.is_none() {
            return Err(StoreError::Invalid("nothing to update".into()));
        }
        Ok(Self {
            name: self
                .name
                .map(|n| required("name", &n, MAX_NAME_LEN))
                .transpose()?,
            email: self
                .email
                .map(|e| required("email", &e, MAX_EMAIL_LEN))
                .transpose()?,
        })
    }

    /// Apply the patch to a record, leaving its id alone.
    pub fn apply(self, record: &mut UserRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(email) = self.email {
            record.email = email;
        }
    }
}

fn required(field: &str, value: &str, max_len: usize) -> Result<String, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Invalid(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(StoreError::Invalid(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

/// Errors raised by record store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(i64),

    #[error("invalid user: {0}")]
    Invalid(String),

    #[error("record store connection failed: {0}")]
    Connection(String),

    #[error("record store query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Create/read/update/delete over user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return it with its freshly assigned id.
    async fn create(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// All users, ordered by id.
    async fn list(&self) -> StoreResult<Vec<UserRecord>>;

    async fn find(&self, id: i64) -> StoreResult<Option<UserRecord>>;

    /// Apply `patch` to user `id`. Fails with `NotFound` for unknown ids.
    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<UserRecord>;

    /// Remove user `id`. Fails with `NotFound` for unknown ids.
    async fn delete(&self, id: i64) -> StoreResult<()>;
}
