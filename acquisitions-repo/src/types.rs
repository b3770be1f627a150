//! Database row types and conversions shared by the adapters.

use sqlx::FromRow;

use acquisitions_types::{RepoError, Role, User, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// User row as stored by SQLite (UUIDs and timestamps are TEXT).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteUserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

/// User row as stored by PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgUserRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Column list selected by every user query.
pub const USER_COLUMNS: &str = "id, name, email, password, role, created_at";

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_role(s: &str) -> Result<Role, RepoError> {
    s.parse::<Role>().map_err(RepoError::Domain)
}

/// Maps an insert failure, turning unique-index violations into `Conflict`.
pub fn map_insert_error(err: sqlx::Error, email: &str) -> RepoError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            RepoError::Conflict(format!("email already registered: {}", email))
        }
        _ => RepoError::Database(err.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
impl SqliteUserRow {
    /// Convert database row to domain User.
    pub fn into_domain(self) -> Result<User, RepoError> {
        let id = uuid::Uuid::parse_str(&self.id).map_err(|e| RepoError::Database(e.to_string()))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| RepoError::Database(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(User::from_parts(
            UserId::from_uuid(id),
            self.name,
            self.email,
            self.password,
            parse_role(&self.role)?,
            created_at,
        ))
    }
}

#[cfg(feature = "postgres")]
impl PgUserRow {
    /// Convert database row to domain User.
    pub fn into_domain(self) -> Result<User, RepoError> {
        Ok(User::from_parts(
            UserId::from_uuid(self.id),
            self.name,
            self.email,
            self.password,
            parse_role(&self.role)?,
            self.created_at,
        ))
    }
}
