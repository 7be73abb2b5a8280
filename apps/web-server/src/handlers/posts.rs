//! Post creation.

use actix_web::{HttpResponse, web};
use validator::Validate;

use blog_core::domain::{Post, User};
use blog_shared::{FormErrors, PostForm};

use crate::middleware::auth::CurrentUser;
use crate::middleware::csrf::CsrfToken;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

fn render_post_form(
    state: &AppState,
    user: &User,
    csrf: &CsrfToken,
    form: &PostForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page_context(Some(user), Some(csrf));
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    let body = state.views.render("post.html", &ctx)?;
    Ok(views::html(body, Some(csrf), &state.settings))
}

/// GET /post
pub async fn new_post_form(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    csrf: CsrfToken,
) -> AppResult<HttpResponse> {
    render_post_form(&state, &user, &csrf, &PostForm::default(), &FormErrors::new())
}

/// POST /post
pub async fn create_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    csrf: CsrfToken,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    csrf.verify(&state.settings, form.csrf_token.as_deref())?;

    let mut form = form.into_inner();
    form.title = form.title.trim().to_string();

    if let Err(e) = form.validate() {
        return render_post_form(&state, &user, &csrf, &form, &FormErrors::from(e));
    }

    let post = state
        .posts
        .save(Post::new(user.id, form.title, form.content))
        .await?;
    tracing::info!(user_id = %user.id, post_id = %post.id, "Post created");

    Ok(views::redirect("/home").finish())
}
