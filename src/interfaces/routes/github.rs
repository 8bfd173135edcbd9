use actix_web::web;

use crate::handlers::github;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/github-repos")
            .service(
                web::resource("")
                    .route(web::get().to(github::list_github_repos))
            )
            .service(
                web::resource("/refresh")
                    .route(web::post().to(github::refresh_github_repos))
            )
            .service(
                web::resource("/cards")
                    .route(web::get().to(github::github_repo_cards))
            )
    );
}
