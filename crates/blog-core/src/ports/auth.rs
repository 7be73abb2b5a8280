//! Password hashing and session token ports.

use uuid::Uuid;

/// Claims carried by a signed session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    /// Key of the server-side session record.
    pub session_id: Uuid,
    pub exp: i64,
}

/// Issues and verifies the tokens stored in the session cookie.
pub trait TokenService: Send + Sync {
    /// Sign a token binding `user_id` to the server-side session `session_id`.
    fn issue(&self, user_id: Uuid, session_id: Uuid) -> Result<String, AuthError>;

    /// Verify signature, issuer and expiry, and decode the claims.
    fn validate(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// How long an issued token stays valid.
    fn lifetime_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("No session")]
    MissingSession,

    #[error("Session revoked")]
    SessionRevoked,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
