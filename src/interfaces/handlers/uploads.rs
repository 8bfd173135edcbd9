use std::io;

use actix_web::{http::header, web, HttpResponse};
use tracing::instrument;

use crate::{
    errors::AppError,
    storage::uploads::{content_type_for, UploadError},
    AppState,
};

/// Serves stored uploads. Only names the store generates are looked up.
#[instrument(skip(state))]
pub async fn serve_upload(state: web::Data<AppState>, filename: web::Path<String>) -> Result<HttpResponse, AppError> {
    let name = filename.into_inner();

    let bytes = match state.uploads.read(&name).await {
        Ok(bytes) => bytes,
        Err(UploadError::InvalidName(_)) => return Err(AppError::NotFound(name)),
        Err(UploadError::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Err(AppError::NotFound(name)),
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&name))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
