//! CSRF protection - double-submit token.
//!
//! Form pages embed the value of the `csrf_token` cookie in a hidden field;
//! form posts must echo it back. A visitor without the cookie gets a fresh
//! one with the next form page.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::middleware::error::AppError;
use crate::state::WebSettings;

/// Name of the CSRF cookie and form field.
pub const CSRF_COOKIE: &str = "csrf_token";

/// CSRF token for the current request.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    value: String,
    /// True when the value came from the request's cookie.
    from_cookie: bool,
}

impl CsrfToken {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cookie to set on the response, when the visitor does not have one yet.
    pub fn cookie(&self, settings: &WebSettings) -> Option<Cookie<'static>> {
        if self.from_cookie {
            return None;
        }
        Some(
            Cookie::build(CSRF_COOKIE, self.value.clone())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(settings.cookie_secure)
                .finish(),
        )
    }

    /// Check a submitted form token against the cookie.
    pub fn verify(&self, settings: &WebSettings, submitted: Option<&str>) -> Result<(), AppError> {
        if !settings.csrf_enabled {
            return Ok(());
        }

        let matches = self.from_cookie
            && submitted.is_some_and(|s| {
                bool::from(s.as_bytes().ct_eq(self.value.as_bytes()))
            });

        if matches {
            Ok(())
        } else {
            tracing::warn!("Rejected form post with missing or invalid CSRF token");
            Err(AppError::BadRequest(
                "The CSRF token is missing or invalid.".to_string(),
            ))
        }
    }
}

impl FromRequest for CsrfToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match req.cookie(CSRF_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => CsrfToken {
                value: cookie.value().to_string(),
                from_cookie: true,
            },
            _ => CsrfToken {
                value: Uuid::new_v4().simple().to_string(),
                from_cookie: false,
            },
        };
        ready(Ok(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::time::Duration;

    fn settings(enabled: bool) -> WebSettings {
        WebSettings {
            csrf_enabled: enabled,
            cookie_secure: false,
            session_lifetime: Duration::from_secs(60),
        }
    }

    async fn extract(req: TestRequest) -> CsrfToken {
        let (req, mut payload) = req.to_http_parts();
        CsrfToken::from_request(&req, &mut payload).await.unwrap()
    }

    #[actix_web::test]
    async fn test_fresh_token_issues_cookie() {
        let token = extract(TestRequest::default()).await;

        let cookie = token.cookie(&settings(true)).unwrap();
        assert_eq!(cookie.value(), token.value());
        // Without the cookie the post cannot match.
        assert!(token.verify(&settings(true), Some(token.value())).is_err());
    }

    #[actix_web::test]
    async fn test_matching_token_accepted() {
        let token = extract(
            TestRequest::default().cookie(Cookie::new(CSRF_COOKIE, "abc123")),
        )
        .await;

        assert!(token.cookie(&settings(true)).is_none());
        assert!(token.verify(&settings(true), Some("abc123")).is_ok());
        assert!(token.verify(&settings(true), Some("abc124")).is_err());
        assert!(token.verify(&settings(true), None).is_err());
    }

    #[actix_web::test]
    async fn test_disabled_accepts_anything() {
        let token = extract(TestRequest::default()).await;
        assert!(token.verify(&settings(false), None).is_ok());
    }
}
