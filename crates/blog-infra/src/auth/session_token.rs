//! JWT session token service - the signed value of the session cookie.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blog_core::ports::{AuthError, SessionClaims, TokenService};

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct SessionTokenConfig {
    /// Signing key (the site's `SECRET_KEY`).
    pub secret: String,
    pub lifetime_hours: i64,
    pub issuer: String,
}

impl Default for SessionTokenConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            lifetime_hours: 24,
            issuer: "blog-site".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    sid: String, // server-side session id
    exp: i64,
    iat: i64,
    iss: String,
}

/// HS256-signed session tokens.
pub struct JwtSessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: SessionTokenConfig,
}

impl JwtSessionTokenService {
    pub fn new(config: SessionTokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, AuthError> {
    Uuid::parse_str(raw).map_err(|e| AuthError::InvalidToken(e.to_string()))
}

impl TokenService for JwtSessionTokenService {
    fn issue(&self, user_id: Uuid, session_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.lifetime_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(SessionClaims {
            user_id: parse_uuid(&data.claims.sub)?,
            session_id: parse_uuid(&data.claims.sid)?,
            exp: data.claims.exp,
        })
    }

    fn lifetime_seconds(&self) -> i64 {
        self.config.lifetime_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, issuer: &str) -> JwtSessionTokenService {
        JwtSessionTokenService::new(SessionTokenConfig {
            secret: secret.to_string(),
            lifetime_hours: 1,
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = service("test-secret-key", "test-issuer");
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let token = service.issue(user_id, session_id).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.session_id, session_id);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_validate_garbage() {
        let result = service("k", "i").validate("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_rejects_other_secret() {
        let token = service("secret-a", "blog")
            .issue(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        assert!(service("secret-b", "blog").validate(&token).is_err());
    }

    #[test]
    fn test_validate_rejects_other_issuer() {
        let token = service("same", "issuer1")
            .issue(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        assert!(service("same", "issuer2").validate(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let expired = JwtSessionTokenService::new(SessionTokenConfig {
            secret: "k".to_string(),
            lifetime_hours: -2,
            issuer: "blog".to_string(),
        });
        let token = expired.issue(Uuid::new_v4(), Uuid::new_v4()).unwrap();

        assert!(matches!(
            expired.validate(&token),
            Err(AuthError::SessionExpired)
        ));
    }

    #[test]
    fn test_lifetime_seconds() {
        let service = JwtSessionTokenService::new(SessionTokenConfig::default());
        assert_eq!(service.lifetime_seconds(), 86400);
    }
}
