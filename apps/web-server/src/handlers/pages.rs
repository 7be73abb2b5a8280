//! Public pages.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::OptionalUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{self, PostView};

/// GET / and GET /home - every post, newest first.
pub async fn home(state: web::Data<AppState>, user: OptionalUser) -> AppResult<HttpResponse> {
    let posts: Vec<PostView> = state
        .posts
        .find_recent_with_authors()
        .await?
        .into_iter()
        .map(PostView::from)
        .collect();

    let mut ctx = views::page_context(user.0.as_ref(), None);
    ctx.insert("posts", &posts);
    let body = state.views.render("home.html", &ctx)?;
    Ok(views::html(body, None, &state.settings))
}

/// GET /about
pub async fn about(state: web::Data<AppState>, user: OptionalUser) -> AppResult<HttpResponse> {
    let ctx = views::page_context(user.0.as_ref(), None);
    let body = state.views.render("about.html", &ctx)?;
    Ok(views::html(body, None, &state.settings))
}

/// Fallback for unrouted paths.
pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound(
        "The requested page does not exist.".to_string(),
    ))
}
