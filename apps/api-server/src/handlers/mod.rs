//! HTTP handlers and route configuration.

mod health;
mod user;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Current user routes, all require a bearer token
            .service(
                web::scope("/me")
                    .route("", web::get().to(user::get_user))
                    .route("", web::put().to(user::update_user))
                    .route("", web::delete().to(user::delete_user))
                    .route("/posts", web::get().to(user::list_posts))
                    .route("/posts", web::post().to(user::add_post))
                    .route("/posts/{post_id}", web::delete().to(user::remove_post)),
            ),
    );
}
