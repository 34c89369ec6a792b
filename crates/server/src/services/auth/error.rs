//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during token issuing and verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair does not match the configured admin identity.
    /// Deliberately does not reveal which field was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No `Authorization: Bearer` header on a protected request.
    #[error("missing token")]
    MissingToken,

    /// Signature check or expiry check failed.
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),
}
