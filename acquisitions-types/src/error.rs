//! Error types for the acquisitions service.

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Credential service errors.
///
/// `InvalidCredentials` reads the same whether the email or the password
/// was wrong.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Error hashing password")]
    Hashing,

    #[error("Error comparing password")]
    Comparison,

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("Error creating user")]
    UserCreation,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] RepoError),
}

/// Decision engine failures. Never a denial.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Decision engine unreachable: {0}")]
    Transport(String),

    #[error("Decision engine returned status {0}")]
    Status(u16),

    #[error("Malformed decision: {0}")]
    Decode(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The detail is logged, never sent to the client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(details) => AppError::Validation(details),
            DomainError::InvalidRole(role) => {
                AppError::Validation(vec![format!("role: unknown role '{}'", role)])
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            // The route cannot tell a duplicate from a storage failure here.
            AuthError::UserCreation | AuthError::DuplicateEmail => {
                AppError::Conflict(err.to_string())
            }
            AuthError::Hashing | AuthError::Comparison => AppError::Internal(err.to_string()),
            AuthError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
