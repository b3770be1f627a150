//! User store port trait.
//!
//! Adapters (Postgres, SQLite, in-memory fakes) implement this trait.

use crate::domain::{NewUser, User};
use crate::error::RepoError;

/// The persistence port for user records.
///
/// Email is the unique key and matching is exact (case-sensitive).
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Finds the user with exactly this email, digest included.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Inserts a user and returns the stored row.
    ///
    /// MUST reject a duplicate email atomically with [`RepoError::Conflict`],
    /// even when a concurrent caller passed the same pre-check.
    async fn insert_user(&self, user: NewUser) -> Result<User, RepoError>;
}
