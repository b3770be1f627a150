//! Credential Service
//!
//! Registers and authenticates users through the `UserRepository` port.
//! The only component that reads or writes password material.

use acquisitions_types::{
    AuthError, Credentials, NewUser, PublicUser, RegisterUser, RepoError, UserRepository,
};

use crate::password::{hash_password, verify_password};

/// Application service for user credentials.
///
/// Generic over `R: UserRepository` - the adapter is injected at compile time.
/// This enables:
/// - Swapping stores without code changes
/// - Testing with an in-memory repo
pub struct AuthService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AuthService<R> {
    /// Creates a new credential service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a new user.
    ///
    /// Every failure, a duplicate email included, is logged and returned as
    /// [`AuthError::UserCreation`]. Use [`Self::register_user_diagnostic`] to
    /// see the specific cause.
    pub async fn register_user(&self, input: RegisterUser) -> Result<PublicUser, AuthError> {
        let email = input.email.clone();

        self.register_user_diagnostic(input).await.map_err(|e| {
            tracing::error!(email = %email, "Error creating user: {}", e);
            AuthError::UserCreation
        })
    }

    /// Registers a new user, returning the specific failure cause.
    pub async fn register_user_diagnostic(
        &self,
        input: RegisterUser,
    ) -> Result<PublicUser, AuthError> {
        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(&input.password).await?;

        // The pre-check above is not atomic with the insert; the store's
        // unique index settles concurrent registrations.
        let user = self
            .repo
            .insert_user(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                role: input.role,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Store(other),
            })?;

        tracing::info!("User {} created successfully", user.email);

        Ok(user.into_public())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────────

    /// Verifies credentials and returns the user without its digest.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn authenticate_user(&self, credentials: Credentials) -> Result<PublicUser, AuthError> {
        let result = self.check_credentials(&credentials).await;

        match &result {
            Ok(user) => tracing::info!("User {} authenticated successfully", user.email),
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!(email = %credentials.email, "Error authenticating user: invalid credentials")
            }
            Err(e) => tracing::error!(email = %credentials.email, "Error authenticating user: {}", e),
        }

        result
    }

    async fn check_credentials(&self, credentials: &Credentials) -> Result<PublicUser, AuthError> {
        let user = self
            .repo
            .find_by_email(&credentials.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&credentials.password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.into_public())
    }
}
