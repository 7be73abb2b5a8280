//! Server-side sessions carried by a signed cookie.
//!
//! The cookie holds a session token naming a session record in
//! [`AppState::sessions`]. A request is authenticated only while the token
//! verifies, its record exists and points at the same user, and that user
//! still exists. Ending a session deletes the record, so a replayed cookie
//! stops working.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time};
use uuid::Uuid;

use blog_core::domain::User;
use blog_core::ports::AuthError;

use crate::middleware::error::AppResult;
use crate::state::{AppState, WebSettings};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

fn record_key(session_id: Uuid) -> String {
    format!("session:{}", session_id)
}

/// Open a session for `user` and return the cookie that carries it.
///
/// With `remember` the cookie persists for the session lifetime; otherwise it
/// ends with the browser session.
pub async fn start(state: &AppState, user: &User, remember: bool) -> AppResult<Cookie<'static>> {
    let session_id = Uuid::new_v4();
    let settings = &state.settings;

    state
        .sessions
        .set(
            &record_key(session_id),
            &user.id.to_string(),
            Some(settings.session_lifetime),
        )
        .await?;

    let token = state.tokens.issue(user.id, session_id)?;

    let mut builder = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.cookie_secure);
    if remember {
        let secs = i64::try_from(settings.session_lifetime.as_secs()).unwrap_or(i64::MAX);
        builder = builder.max_age(time::Duration::seconds(secs));
    }

    tracing::info!(user_id = %user.id, remember, "Session started");
    Ok(builder.finish())
}

/// Identify the user behind the request's session cookie.
///
/// The outer error is an infrastructure failure; the inner one says why the
/// request is not authenticated.
pub async fn resolve(state: &AppState, req: &HttpRequest) -> AppResult<Result<User, AuthError>> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(Err(AuthError::MissingSession));
    };

    let claims = match state.tokens.validate(cookie.value()) {
        Ok(claims) => claims,
        Err(e) => return Ok(Err(e)),
    };

    match state.sessions.get(&record_key(claims.session_id)).await {
        Some(owner) if owner == claims.user_id.to_string() => {}
        _ => return Ok(Err(AuthError::SessionRevoked)),
    }

    match state.users.find_by_id(claims.user_id).await? {
        Some(user) => Ok(Ok(user)),
        None => Ok(Err(AuthError::SessionRevoked)),
    }
}

/// Delete the server-side record behind the request's cookie, if any.
pub async fn end(state: &AppState, req: &HttpRequest) -> AppResult<()> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(());
    };

    // An expired or forged token has no record worth deleting; the store's
    // TTL reaps expired ones.
    if let Ok(claims) = state.tokens.validate(cookie.value()) {
        state.sessions.delete(&record_key(claims.session_id)).await?;
        tracing::info!(user_id = %claims.user_id, "Session ended");
    }

    Ok(())
}

/// Cookie that makes the browser drop the session cookie.
pub fn removal_cookie(settings: &WebSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.cookie_secure)
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    use crate::config::AppConfig;

    async fn state_with_user() -> (AppState, User) {
        let state = AppState::in_memory(&AppConfig::for_tests()).unwrap();
        let user = User::new(
            "admin".to_string(),
            "admin".to_string(),
            "admin@admin.com".to_string(),
            "$argon2id$stub".to_string(),
        );
        let user = state.users.save(user).await.unwrap();
        (state, user)
    }

    #[actix_web::test]
    async fn test_start_then_resolve() {
        let (state, user) = state_with_user().await;

        let cookie = start(&state, &user, false).await.unwrap();
        assert!(cookie.http_only().unwrap_or(false));
        assert!(cookie.max_age().is_none());

        let req = TestRequest::default().cookie(cookie).to_http_request();
        let resolved = resolve(&state, &req).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[actix_web::test]
    async fn test_remember_sets_max_age() {
        let (state, user) = state_with_user().await;

        let cookie = start(&state, &user, true).await.unwrap();
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
    }

    #[actix_web::test]
    async fn test_missing_cookie() {
        let (state, _) = state_with_user().await;
        let req = TestRequest::default().to_http_request();

        let result = resolve(&state, &req).await.unwrap();
        assert!(matches!(result, Err(AuthError::MissingSession)));
    }

    #[actix_web::test]
    async fn test_end_revokes_replayed_cookie() {
        let (state, user) = state_with_user().await;
        let cookie = start(&state, &user, false).await.unwrap();

        let req = TestRequest::default().cookie(cookie.clone()).to_http_request();
        end(&state, &req).await.unwrap();

        let replay = TestRequest::default().cookie(cookie).to_http_request();
        let result = resolve(&state, &replay).await.unwrap();
        assert!(matches!(result, Err(AuthError::SessionRevoked)));
    }

    #[actix_web::test]
    async fn test_record_for_other_user_rejected() {
        let (state, user) = state_with_user().await;
        let session_id = Uuid::new_v4();
        state
            .sessions
            .set(&record_key(session_id), &Uuid::new_v4().to_string(), None)
            .await
            .unwrap();
        let token = state.tokens.issue(user.id, session_id).unwrap();

        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_http_request();
        let result = resolve(&state, &req).await.unwrap();
        assert!(matches!(result, Err(AuthError::SessionRevoked)));
    }

    #[actix_web::test]
    async fn test_tampered_token_rejected() {
        let (state, _) = state_with_user().await;
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "forged.token.value"))
            .to_http_request();

        let result = resolve(&state, &req).await.unwrap();
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_removal_cookie_expires() {
        let cookie = removal_cookie(&WebSettings {
            csrf_enabled: false,
            cookie_secure: false,
            session_lifetime: std::time::Duration::from_secs(60),
        });
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
