use actix_web::web;

use crate::handlers::home::home;

mod contact;
mod github;
mod json_error;
mod projects;
mod resume;
mod system;
mod uploads;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .configure(system::config_routes)
            .configure(projects::config_routes)
            .configure(contact::config_routes)
            .configure(resume::config_routes)
            .configure(github::config_routes)
    );

    cfg.configure(uploads::config_routes);
    cfg.configure(json_error::config_routes);
}
