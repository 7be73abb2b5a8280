//! Account page: view, update and delete the signed-in user.

use actix_web::{HttpRequest, HttpResponse, web};
use validator::Validate;

use blog_core::domain::User;
use blog_shared::dto::CsrfOnlyForm;
use blog_shared::{AccountForm, EMAIL_IN_USE, FormErrors, normalize_email};

use crate::middleware::auth::CurrentUser;
use crate::middleware::csrf::CsrfToken;
use crate::middleware::error::AppResult;
use crate::middleware::session;
use crate::state::AppState;
use crate::views;

fn render_account(
    state: &AppState,
    user: &User,
    csrf: &CsrfToken,
    form: &AccountForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page_context(Some(user), Some(csrf));
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    let body = state.views.render("account.html", &ctx)?;
    Ok(views::html(body, Some(csrf), &state.settings))
}

/// GET /account - the form starts with the stored values.
pub async fn account(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    csrf: CsrfToken,
) -> AppResult<HttpResponse> {
    let form = AccountForm {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        csrf_token: None,
    };
    render_account(&state, &user, &csrf, &form, &FormErrors::new())
}

/// POST /account
pub async fn update_account(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    csrf: CsrfToken,
    form: web::Form<AccountForm>,
) -> AppResult<HttpResponse> {
    csrf.verify(&state.settings, form.csrf_token.as_deref())?;

    let mut form = form.into_inner();
    form.first_name = form.first_name.trim().to_string();
    form.last_name = form.last_name.trim().to_string();
    form.email = normalize_email(&form.email);

    let mut errors = match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => FormErrors::from(e),
    };
    if errors.get("email").is_empty() && form.email != user.email {
        if let Some(other) = state.users.find_by_email(&form.email).await? {
            if other.id != user.id {
                errors.add("email", EMAIL_IN_USE);
            }
        }
    }
    if !errors.is_empty() {
        return render_account(&state, &user, &csrf, &form, &errors);
    }

    let mut updated = user.clone();
    updated.update_profile(
        form.first_name.clone(),
        form.last_name.clone(),
        form.email.clone(),
    );

    match state.users.save(updated).await {
        Ok(saved) => {
            tracing::info!(user_id = %saved.id, "Account updated");
            Ok(views::redirect("/account").finish())
        }
        Err(e) if e.is_constraint() => {
            errors.add("email", EMAIL_IN_USE);
            render_account(&state, &user, &csrf, &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /account_delete - removes the user and their posts, then signs out.
pub async fn delete_account(
    state: web::Data<AppState>,
    req: HttpRequest,
    CurrentUser(user): CurrentUser,
    csrf: CsrfToken,
    form: Option<web::Form<CsrfOnlyForm>>,
) -> AppResult<HttpResponse> {
    let submitted = form.as_ref().and_then(|f| f.csrf_token.as_deref());
    csrf.verify(&state.settings, submitted)?;

    let posts_removed = state.posts.delete_by_user_id(user.id).await?;
    state.users.delete(user.id).await?;
    session::end(&state, &req).await?;

    tracing::info!(user_id = %user.id, posts_removed, "Account deleted");

    Ok(views::redirect("/register")
        .cookie(session::removal_cookie(&state.settings))
        .finish())
}
