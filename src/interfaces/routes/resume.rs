use actix_web::web;

use crate::handlers::resume;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/upload-resume")
            .route(web::post().to(resume::upload_resume))
    );

    cfg.service(
        web::scope("/resume")
            .service(
                web::resource("")
                    .route(web::get().to(resume::resume_info))
            )
            .service(
                web::resource("/current")
                    .route(web::get().to(resume::current_resume))
            )
            .service(
                web::resource("/view/{filename}")
                    .route(web::get().to(resume::view_resume))
            )
            .service(
                web::resource("/download/{filename}")
                    .route(web::get().to(resume::download_resume))
            )
    );

    cfg.service(
        web::scope("/resumes")
            .service(
                web::resource("")
                    .route(web::get().to(resume::list_resumes))
            )
            .service(
                web::resource("/{resume_id}/set-current")
                    .route(web::put().to(resume::set_current_resume))
            )
    );
}
