//! Tera views - HTML pages rendered from the templates in `templates/`.

use actix_web::{HttpResponse, HttpResponseBuilder, http::header, http::header::ContentType};
use serde::Serialize;
use tera::{Context, Tera};

use blog_core::domain::{AuthoredPost, User};

use crate::middleware::csrf::CsrfToken;
use crate::middleware::error::{AppError, AppResult};
use crate::state::WebSettings;

const TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("post.html", include_str!("../templates/post.html")),
    ("account.html", include_str!("../templates/account.html")),
];

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, ctx: &Context) -> AppResult<String> {
        self.tera
            .render(template, ctx)
            .map_err(|e| AppError::Internal(format!("rendering {}: {:?}", template, e)))
    }
}

/// Context every page gets: the nav bar's view of the session and, on
/// form pages, the CSRF token.
pub fn page_context(user: Option<&User>, csrf: Option<&CsrfToken>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("current_user", &user);
    ctx.insert("csrf_token", csrf.map(CsrfToken::value).unwrap_or_default());
    ctx
}

/// One entry of the home page listing.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub title: String,
    pub content: String,
    pub author: String,
    pub posted_on: String,
}

impl From<AuthoredPost> for PostView {
    fn from(entry: AuthoredPost) -> Self {
        Self {
            posted_on: entry.post.created_at.format("%Y-%m-%d").to_string(),
            title: entry.post.title,
            content: entry.post.content,
            author: entry.author,
        }
    }
}

/// `200 OK` HTML page, setting the CSRF cookie when the visitor lacks one.
pub fn html(body: String, csrf: Option<&CsrfToken>, settings: &WebSettings) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    with_csrf_cookie(&mut builder, csrf, settings);
    builder.body(body)
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}

fn with_csrf_cookie(builder: &mut HttpResponseBuilder, csrf: Option<&CsrfToken>, settings: &WebSettings) {
    if let Some(cookie) = csrf.and_then(|t| t.cookie(settings)) {
        builder.cookie(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn test_home_escapes_post_content() {
        let views = Views::new().unwrap();
        let mut ctx = page_context(None, None);
        ctx.insert(
            "posts",
            &[PostView {
                title: "<script>alert(1)</script>".to_string(),
                content: "body".to_string(),
                author: "test user".to_string(),
                posted_on: "2024-01-01".to_string(),
            }],
        );

        let page = views.render("home.html", &ctx).unwrap();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("Login"));
    }
}
