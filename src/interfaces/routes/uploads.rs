use actix_web::web;

use crate::{constants::UPLOADS_ROUTE, handlers::uploads};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(format!("{UPLOADS_ROUTE}/{{filename}}"))
            .route(web::get().to(uploads::serve_upload))
    );
}
