use actix_web::{web, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::{
    entities::message::{ClientMeta, ContactForm, StatusUpdateRequest},
    errors::AppError,
    utils::get_client_ip::{get_client_ip, get_user_agent},
    AppState,
};

#[instrument(skip(req, state, form))]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<HttpResponse, AppError> {
    let client = ClientMeta {
        ip_address: get_client_ip(&req, state.trust_x_forwarded_for),
        user_agent: get_user_agent(&req),
    };

    let outcome = state.contact_handler.submit(form.into_inner(), client).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(skip(state))]
pub async fn list_messages(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let response = state.contact_handler.list_messages().await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn mark_message_read(
    state: web::Data<AppState>,
    message_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let response = state.contact_handler.mark_read(message_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state, body))]
pub async fn update_message_status(
    state: web::Data<AppState>,
    message_id: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .contact_handler
        .update_status(message_id.into_inner(), body.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
