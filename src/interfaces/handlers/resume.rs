use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpResponse};
use futures_util::TryStreamExt;
use tracing::instrument;

use crate::{
    entities::resume::{
        attachment_header, CurrentResumeResponse, Disposition, IncomingFile, ResumeInfoResponse, RESUME_MIME_TYPE,
    },
    errors::AppError,
    use_cases::resume::ResumeHandler,
    AppState,
};

const RESUME_FIELD: &str = "resume";

/// Reads the `resume` part of a multipart body. The declared type is checked
/// before the first chunk is read and the size while streaming, so a wrong or
/// oversized file never reaches the disk.
#[instrument(skip(state, payload))]
pub async fn upload_resume(state: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, AppError> {
    let max_bytes = state.resume_handler.max_resume_bytes;

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(RESUME_FIELD) {
            while field.try_next().await?.is_some() {}
            continue;
        }

        ResumeHandler::check_declared_type(field.content_type().map(|m| m.essence_str()))?;
        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("resume.pdf")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > max_bytes {
                tracing::warn!(limit = max_bytes, "Resume upload exceeded size limit");
                return Err(AppError::PayloadTooLarge(format!("Resume exceeds {max_bytes} bytes")));
            }
            bytes.extend_from_slice(&chunk);
        }

        let file = IncomingFile {
            original_name,
            content_type: Some(RESUME_MIME_TYPE.to_string()),
            bytes,
        };
        let response = state.resume_handler.upload(file).await?;
        return Ok(HttpResponse::Created().json(response));
    }

    Err(AppError::MissingFile(RESUME_FIELD.to_string()))
}

#[instrument(skip(state))]
pub async fn current_resume(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let current = state.resume_handler.current().await?;
    let message = current.describe().to_string();

    Ok(HttpResponse::Ok().json(CurrentResumeResponse {
        resume: current.into_inner(),
        message,
    }))
}

#[instrument(skip(state))]
pub async fn resume_info(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let resume = state.resume_handler.current().await?.into_inner();
    Ok(HttpResponse::Ok().json(ResumeInfoResponse { success: true, resume }))
}

#[instrument(skip(state))]
pub async fn list_resumes(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let response = state.resume_handler.list().await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn set_current_resume(state: web::Data<AppState>, resume_id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let response = state.resume_handler.set_current(resume_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn view_resume(state: web::Data<AppState>, filename: web::Path<String>) -> Result<HttpResponse, AppError> {
    serve_resume(&state, &filename, Disposition::Inline).await
}

#[instrument(skip(state))]
pub async fn download_resume(state: web::Data<AppState>, filename: web::Path<String>) -> Result<HttpResponse, AppError> {
    serve_resume(&state, &filename, Disposition::Attachment).await
}

async fn serve_resume(state: &AppState, filename: &str, disposition: Disposition) -> Result<HttpResponse, AppError> {
    let file = state.resume_handler.open(filename).await?;
    let content_disposition = match disposition {
        Disposition::Inline => "inline".to_string(),
        Disposition::Attachment => attachment_header(&file.resume.original_name),
    };

    Ok(HttpResponse::Ok()
        .content_type(RESUME_MIME_TYPE)
        .insert_header((header::CONTENT_DISPOSITION, content_disposition))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(file.bytes))
}
