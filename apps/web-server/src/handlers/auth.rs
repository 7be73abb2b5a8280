//! Registration, login and logout.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use validator::Validate;

use blog_core::domain::User;
use blog_shared::{EMAIL_IN_USE, FormErrors, LoginForm, RegisterForm, normalize_email};

use crate::middleware::auth::OptionalUser;
use crate::middleware::csrf::CsrfToken;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session;
use crate::state::AppState;
use crate::views;

const LOGIN_FAILED: &str = "Login unsuccessful. Please check email and password.";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Where to go after signing in: `next` when it is a path on this site,
/// otherwise the home page.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/home",
    }
}

/// A single leading `/` and nothing a browser strips or folds while parsing
/// the URL: `"/\t/host"` is read as `//host`.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path
            .chars()
            .any(|c| c == '\\' || c.is_control() || c.is_whitespace())
}

fn render_register(
    state: &AppState,
    csrf: &CsrfToken,
    form: &RegisterForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page_context(None, Some(csrf));
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    let body = state.views.render("register.html", &ctx)?;
    Ok(views::html(body, Some(csrf), &state.settings))
}

fn render_login(
    state: &AppState,
    csrf: &CsrfToken,
    form: &LoginForm,
    errors: &FormErrors,
    login_error: Option<&str>,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page_context(None, Some(csrf));
    ctx.insert("email", &form.email);
    ctx.insert("next", &form.next);
    ctx.insert("errors", errors);
    ctx.insert("login_error", &login_error);
    let body = state.views.render("login.html", &ctx)?;
    Ok(views::html(body, Some(csrf), &state.settings))
}

/// Run the password hasher off the async workers.
async fn hash_password(state: &AppState, password: String) -> AppResult<String> {
    let passwords = state.passwords.clone();
    let hashed = web::block(move || passwords.hash(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(hashed)
}

async fn verify_password(state: &AppState, password: String, hash: String) -> AppResult<bool> {
    let passwords = state.passwords.clone();
    let valid = web::block(move || passwords.verify(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(valid)
}

/// GET /register
pub async fn register_form(
    state: web::Data<AppState>,
    user: OptionalUser,
    csrf: CsrfToken,
) -> AppResult<HttpResponse> {
    if user.0.is_some() {
        return Ok(views::redirect("/home").finish());
    }
    render_register(&state, &csrf, &RegisterForm::default(), &FormErrors::new())
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    user: OptionalUser,
    csrf: CsrfToken,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    csrf.verify(&state.settings, form.csrf_token.as_deref())?;
    if user.0.is_some() {
        return Ok(views::redirect("/home").finish());
    }

    let mut form = form.into_inner();
    form.first_name = form.first_name.trim().to_string();
    form.last_name = form.last_name.trim().to_string();
    form.email = normalize_email(&form.email);

    let mut errors = match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => FormErrors::from(e),
    };
    if errors.get("email").is_empty() && state.users.find_by_email(&form.email).await?.is_some()
    {
        errors.add("email", EMAIL_IN_USE);
    }
    if !errors.is_empty() {
        return render_register(&state, &csrf, &form, &errors);
    }

    let password_hash = hash_password(&state, form.password.clone()).await?;
    let user = User::new(
        form.first_name.clone(),
        form.last_name.clone(),
        form.email.clone(),
        password_hash,
    );

    match state.users.save(user).await {
        Ok(saved) => {
            tracing::info!(user_id = %saved.id, "User registered");
            Ok(views::redirect("/login").finish())
        }
        // Lost a race with a concurrent registration for the same address.
        Err(e) if e.is_constraint() => {
            errors.add("email", EMAIL_IN_USE);
            render_register(&state, &csrf, &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_form(
    state: web::Data<AppState>,
    user: OptionalUser,
    csrf: CsrfToken,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    if user.0.is_some() {
        return Ok(views::redirect(safe_next(query.next.as_deref())).finish());
    }

    let form = LoginForm {
        next: query.into_inner().next,
        ..LoginForm::default()
    };
    render_login(&state, &csrf, &form, &FormErrors::new(), None)
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    user: OptionalUser,
    csrf: CsrfToken,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    csrf.verify(&state.settings, form.csrf_token.as_deref())?;
    if user.0.is_some() {
        return Ok(views::redirect(safe_next(form.next.as_deref())).finish());
    }

    let mut form = form.into_inner();
    form.email = normalize_email(&form.email);

    if let Err(e) = form.validate() {
        return render_login(&state, &csrf, &form, &FormErrors::from(e), None);
    }

    let Some(account) = state.users.find_by_email(&form.email).await? else {
        tracing::info!("Login failed: unknown email");
        return render_login(&state, &csrf, &form, &FormErrors::new(), Some(LOGIN_FAILED));
    };

    if !verify_password(&state, form.password.clone(), account.password_hash.clone()).await? {
        tracing::info!(user_id = %account.id, "Login failed: wrong password");
        return render_login(&state, &csrf, &form, &FormErrors::new(), Some(LOGIN_FAILED));
    }

    let cookie = session::start(&state, &account, form.remember_me()).await?;
    Ok(views::redirect(safe_next(form.next.as_deref()))
        .cookie(cookie)
        .finish())
}

/// GET /logout
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    session::end(&state, &req).await?;
    Ok(views::redirect("/login")
        .cookie(session::removal_cookie(&state.settings))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::safe_next;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/post")), "/post");
        assert_eq!(safe_next(Some("/account?tab=1")), "/account?tab=1");
        assert_eq!(safe_next(Some("https://evil.example")), "/home");
        assert_eq!(safe_next(Some("//evil.example")), "/home");
        assert_eq!(safe_next(Some("/\\evil.example")), "/home");
        assert_eq!(safe_next(Some("/\t/evil.example")), "/home");
        assert_eq!(safe_next(Some("/\n/evil.example")), "/home");
        assert_eq!(safe_next(Some("/ /evil.example")), "/home");
        assert_eq!(safe_next(Some("/\u{0}/evil.example")), "/home");
        assert_eq!(safe_next(None), "/home");
    }
}
