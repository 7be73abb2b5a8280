//! HTTP handlers and route configuration.

mod account;
mod auth;
mod health;
mod pages;
mod posts;


use actix_web::web;

pub use pages::not_found;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public pages
        .route("/", web::get().to(pages::home))
        .route("/home", web::get().to(pages::home))
        .route("/about", web::get().to(pages::about))
        .route("/health", web::get().to(health::health_check))
        // Auth
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_form))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::get().to(auth::logout))
        // Signed-in only
        .service(
            web::resource("/post")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            web::resource("/account")
                .route(web::get().to(account::account))
                .route(web::post().to(account::update_account)),
        )
        .route("/account_delete", web::post().to(account::delete_account));
}
