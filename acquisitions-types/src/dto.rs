//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{PublicUser, Role};
use crate::error::DomainError;

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 128;

// ─────────────────────────────────────────────────────────────────────────────
// Service inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Input to user registration.
#[derive(Clone)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterUser {
    /// Registration input with the default `user` role.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: Role::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Input to authentication.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a new user.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpRequest {
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
    /// Defaults to `user`.
    #[serde(default)]
    pub role: Role,
}

impl SignUpRequest {
    /// Trims and lowercases the input, then checks field constraints.
    pub fn validate(self) -> Result<RegisterUser, DomainError> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        let name_len = name.chars().count();
        if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name_len) {
            errors.push(format!(
                "name: must be between {} and {} characters",
                MIN_NAME_LEN, MAX_NAME_LEN
            ));
        }

        let email = normalize_email(&self.email);
        if let Err(msg) = check_email(&email) {
            errors.push(msg);
        }

        let password_len = self.password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
            errors.push(format!(
                "password: must be between {} and {} characters",
                MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
            ));
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(RegisterUser {
            name,
            email,
            password: self.password,
            role: self.role,
        })
    }
}

/// Request to sign in.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

impl SignInRequest {
    pub fn validate(self) -> Result<Credentials, DomainError> {
        let mut errors = Vec::new();

        let email = normalize_email(&self.email);
        if let Err(msg) = check_email(&email) {
            errors.push(msg);
        }
        if self.password.is_empty() {
            errors.push("password: is required".to_string());
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(Credentials {
            email,
            password: self.password,
        })
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn check_email(email: &str) -> Result<(), String> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(format!(
            "email: must be at most {} characters",
            MAX_EMAIL_LEN
        ));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err("email: must be a valid email address".to_string())
    }
}

/// Response after sign-up or sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "User signed in successfully")]
    pub message: String,
    pub user: PublicUser,
}

/// Plain message response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Status DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,
    /// RFC 3339 timestamp
    #[schema(example = "2024-01-01T00:00:00Z")]
    pub timestamp: String,
    /// Process uptime in seconds
    #[schema(example = 12.5)]
    pub uptime: f64,
}

/// Error body returned for rejected or failed requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Forbidden")]
    pub error: String,
    #[schema(example = "Too many requests.")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(name: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::default(),
        }
    }

    #[test]
    fn test_sign_up_normalizes_fields() {
        let input = sign_up("  Alice  ", " Alice@Example.COM ", "secret1")
            .validate()
            .unwrap();

        assert_eq!(input.name, "Alice");
        assert_eq!(input.email, "alice@example.com");
        assert_eq!(input.role, Role::User);
    }

    #[test]
    fn test_sign_up_collects_all_errors() {
        let result = sign_up("A", "not-an-email", "123").validate();

        match result {
            Err(DomainError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other.map(|u| u.email)),
        }
    }

    #[test]
    fn test_sign_up_role_defaults_when_missing() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"name":"Bob","email":"bob@example.com","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::User);
    }

    #[test]
    fn test_sign_up_rejects_unknown_role() {
        let result: Result<SignUpRequest, _> = serde_json::from_str(
            r#"{"name":"Bob","email":"bob@example.com","password":"secret1","role":"root"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(check_email("a@x.com").is_ok());
        assert!(check_email("a@x").is_err());
        assert!(check_email("@x.com").is_err());
        assert!(check_email("a@@x.com").is_err());
        assert!(check_email("a b@x.com").is_err());
    }

    #[test]
    fn test_sign_in_requires_password() {
        let req = SignInRequest {
            email: "a@x.com".into(),
            password: String::new(),
        };
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("a@x.com", "hunter22");
        assert!(!format!("{:?}", creds).contains("hunter22"));
    }
}
