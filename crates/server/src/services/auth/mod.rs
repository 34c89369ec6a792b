//! Admin authentication service.
//!
//! Issues and verifies the signed bearer tokens that gate every mutating
//! catalog operation. There is exactly one admin identity, configured via
//! environment variables; authorization is binary.

mod error;

pub use error::AuthError;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::AdminConfig;

/// Tokens are valid for 7 days from issuance.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

const ADMIN_ROLE: &str = "admin";

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin email.
    pub sub: String,
    /// Role marker (always `admin`).
    pub role: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Token issuer/verifier bound to the configured admin identity.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_email: String,
    admin_password: SecretString,
}

impl AuthService {
    /// Create an auth service from the signing secret and admin identity.
    #[must_use]
    pub fn new(jwt_secret: &SecretString, admin: &AdminConfig) -> Self {
        let secret = jwt_secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            admin_email: admin.email.clone(),
            admin_password: admin.password.clone(),
        }
    }

    /// Check a login attempt and issue a signed token on success.
    ///
    /// Email is compared case-insensitively, password exactly.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any mismatch, without
    /// revealing which field was wrong. Returns `AuthError::TokenIssue` if
    /// signing fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub fn issue(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if !email.eq_ignore_ascii_case(&self.admin_email)
            || password != self.admin_password.expose_secret()
        {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: self.admin_email.clone(),
            role: ADMIN_ROLE.to_owned(),
            iat: now,
            exp: now + TOKEN_VALIDITY_DAYS * 86_400,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        tracing::info!("Admin token issued");
        Ok(token)
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOrExpiredToken` if the signature or expiry
    /// check fails.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidOrExpiredToken)
    }

    /// The configured admin email, as echoed back by the login response.
    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_service(secret: &str) -> AuthService {
        let admin = AdminConfig {
            email: "admin@frechnel.com".to_string(),
            password: SecretString::from("freshnel2024"),
        };
        AuthService::new(&SecretString::from(secret.to_owned()), &admin)
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");
        let token = service.issue("admin@frechnel.com", "freshnel2024").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin@frechnel.com");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, TOKEN_VALIDITY_DAYS * 86_400);
    }

    #[test]
    fn test_issue_email_case_insensitive() {
        let service = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");
        assert!(service.issue("Admin@Frechnel.COM", "freshnel2024").is_ok());
    }

    #[test]
    fn test_issue_rejects_wrong_password() {
        let service = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");
        let result = service.issue("admin@frechnel.com", "wrong");
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_issue_rejects_unknown_email() {
        let service = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");
        let result = service.issue("intruder@frechnel.com", "freshnel2024");
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let issuer = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");
        let verifier = test_service("z1&yT5@cV8!nM3$qW6^eG9*sK2#dJ4%h");

        let token = issuer.issue("admin@frechnel.com", "freshnel2024").unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let service = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");

        // Sign an already-expired set of claims with the same key
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin@frechnel.com".to_string(),
            role: "admin".to_string(),
            iat: now - 10 * 86_400,
            exp: now - 3 * 86_400,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j"),
        )
        .unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let service = test_service("k9$mQ2!xR7&vN4@pL8^wB3*zD6#fH1%j");
        assert!(matches!(
            service.verify("not-a-token"),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }
}
