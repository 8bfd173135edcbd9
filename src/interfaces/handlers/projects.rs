use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{http::header::ContentType, web, Either, HttpResponse};
use tracing::instrument;

use crate::{
    entities::project::{ProjectForm, ProjectListing, ProjectUpload},
    errors::AppError,
    AppState,
};

/// Projects accept either a multipart form (with an optional `projectImage`) or plain JSON.
type ProjectInput = Either<MultipartForm<ProjectUpload>, web::Json<ProjectForm>>;

fn split_input(input: Result<ProjectInput, actix_web::Error>) -> Result<(ProjectForm, Option<TempFile>), AppError> {
    match input {
        Ok(Either::Left(form)) => Ok(form.into_inner().into_parts()),
        Ok(Either::Right(json)) => Ok((json.into_inner(), None)),
        Err(e) => Err(AppError::BadRequest(format!(
            "Request must be multipart/form-data or application/json: {e}"
        ))),
    }
}

#[instrument(skip(state))]
pub async fn list_projects(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    match state.project_handler.list_projects().await? {
        ProjectListing::Live(projects) => Ok(HttpResponse::Ok()
            .insert_header(("X-Data-Source", "database"))
            .json(projects)),
        ProjectListing::Fallback(bytes) => Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .insert_header(("X-Data-Source", "fallback"))
            .body(bytes)),
    }
}

#[instrument(skip(state))]
pub async fn get_project(state: web::Data<AppState>, project_id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let project = state.project_handler.get_project(project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(state, input))]
pub async fn create_project(
    state: web::Data<AppState>,
    input: Result<ProjectInput, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let (form, image) = split_input(input)?;
    let response = state.project_handler.create_project(form, image).await?;
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(state, input))]
pub async fn update_project(
    state: web::Data<AppState>,
    project_id: web::Path<i64>,
    input: Result<ProjectInput, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let (form, image) = split_input(input)?;
    let project = state
        .project_handler
        .update_project(project_id.into_inner(), form, image)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Project updated successfully",
        "project": project,
    })))
}

#[instrument(skip(state))]
pub async fn delete_project(state: web::Data<AppState>, project_id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = project_id.into_inner();
    state.project_handler.delete_project(id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Project {id} deleted"),
    })))
}

/// Pulls the repository list from GitHub and upserts it into the projects table.
#[instrument(skip(state))]
pub async fn sync_github_projects(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let listing = state.github_handler.refresh().await?;
    let response = state.project_handler.sync_from_github(&listing.repos).await?;
    Ok(HttpResponse::Ok().json(response))
}
