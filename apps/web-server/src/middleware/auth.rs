//! Authentication extractors.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    http::header, web,
};
use futures::future::LocalBoxFuture;

use blog_core::domain::User;
use blog_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::middleware::session;
use crate::state::AppState;

/// The signed-in user. Requests without a valid session are redirected to
/// the login page, which sends the visitor back here afterwards.
///
/// ```ignore
/// async fn protected_route(CurrentUser(user): CurrentUser) -> impl Responder {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The signed-in user, if any. Never rejects the request.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

/// Redirect to the login page for an unauthenticated request.
#[derive(Debug)]
pub struct AuthenticationError {
    pub reason: AuthError,
    pub login_url: String,
}

impl AuthenticationError {
    fn for_request(req: &HttpRequest, reason: AuthError) -> Self {
        let login_url = serde_urlencoded::to_string([("next", req.path())])
            .map(|query| format!("/login?{}", query))
            .unwrap_or_else(|_| "/login".to_string());
        Self { reason, login_url }
    }
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "login required: {}", self.reason)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!(reason = %self.reason, "Redirecting to login");
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.login_url.clone()))
            .finish()
    }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        AppError::Internal("AppState not found in app data".to_string())
    })
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = app_state(&req)?;
            match session::resolve(&state, &req).await? {
                Ok(user) => Ok(CurrentUser(user)),
                Err(reason) => Err(AuthenticationError::for_request(&req, reason).into()),
            }
        })
    }
}

impl FromRequest for OptionalUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = app_state(&req)?;
            Ok(OptionalUser(session::resolve(&state, &req).await?.ok()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_login_url_carries_next() {
        let req = TestRequest::get().uri("/post").to_http_request();
        let err = AuthenticationError::for_request(&req, AuthError::MissingSession);
        assert_eq!(err.login_url, "/login?next=%2Fpost");

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fpost"
        );
    }
}
