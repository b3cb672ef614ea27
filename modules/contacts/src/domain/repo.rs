use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::contract::model::{Contact, ContactPatch, NewContact};

/// Storage failures as seen by the domain.
///
/// Unique-constraint violations are kept apart so the service can turn them
/// into a field-level conflict instead of a generic failure.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait ContactsRepository: Send + Sync {
    /// Contacts whose name or email contains `search`; empty matches all.
    async fn list(&self, search: &str) -> RepoResult<Vec<Contact>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Contact>>;
    /// Insert and return the assigned id.
    async fn insert(&self, new: &NewContact, created_at: DateTime<Utc>) -> RepoResult<i64>;
    /// Write the present fields of `patch`. Returns false if no row has `id`.
    async fn update(&self, id: i64, patch: &ContactPatch) -> RepoResult<bool>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}
