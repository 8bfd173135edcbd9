use actix_web::web;

use crate::handlers::contact;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contact")
            .route(web::post().to(contact::submit_contact))
    );

    cfg.service(
        web::scope("/messages")
            .service(
                web::resource("")
                    .route(web::get().to(contact::list_messages))
            )
            .service(
                web::resource("/{message_id}/read")
                    .route(web::put().to(contact::mark_message_read))
            )
            .service(
                web::resource("/{message_id}/status")
                    .route(web::put().to(contact::update_message_status))
            )
    );
}
