use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{errors::AppError, handlers::projects};

/// Room for a maximum-size image plus the text fields; the image limit
/// itself is enforced by the project handler.
const PROJECT_FORM_LIMIT: usize = 12 * 1024 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(PROJECT_FORM_LIMIT)
                    .error_handler(|err, _req| AppError::from(err).into())
            )
            .service(
                web::resource("")
                    .route(web::get().to(projects::list_projects))
                    .route(web::post().to(projects::create_project))
            )
            .service(
                web::resource("/sync-github")
                    .route(web::post().to(projects::sync_github_projects))
            )
            .service(
                web::resource("/{project_id}")
                    .route(web::get().to(projects::get_project))
                    .route(web::put().to(projects::update_project))
                    .route(web::delete().to(projects::delete_project))
            )
    );
}
