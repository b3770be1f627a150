//! Password hashing primitive.
//!
//! bcrypt with a fixed work factor. Both operations run on the blocking pool
//! so a request task yields while the hash is computed.

use acquisitions_types::AuthError;

/// bcrypt cost parameter (2^10 rounds).
pub const BCRYPT_COST: u32 = 10;

/// Hashes a password into a salted bcrypt digest.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();

    match tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await {
        Ok(Ok(digest)) => Ok(digest),
        Ok(Err(e)) => {
            tracing::error!("Error hashing password: {}", e);
            Err(AuthError::Hashing)
        }
        Err(e) => {
            tracing::error!("Password hashing task failed: {}", e);
            Err(AuthError::Hashing)
        }
    }
}

/// Checks a password against a bcrypt digest.
pub async fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let digest = digest.to_owned();

    match tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest)).await {
        Ok(Ok(matches)) => Ok(matches),
        Ok(Err(e)) => {
            tracing::error!("Error comparing password: {}", e);
            Err(AuthError::Comparison)
        }
        Err(e) => {
            tracing::error!("Password comparison task failed: {}", e);
            Err(AuthError::Comparison)
        }
    }
}
