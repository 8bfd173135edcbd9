use actix_web::{http::header::ContentType, web, HttpResponse};
use chrono::Utc;
use tracing::instrument;

use crate::{errors::AppError, utils::render::render_grid, AppState};

#[instrument(skip(state))]
pub async fn list_github_repos(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let listing = state.github_handler.repositories().await?;
    Ok(HttpResponse::Ok()
        .insert_header(("X-Cache", listing.source.as_str()))
        .json(listing.repos.as_ref()))
}

#[instrument(skip(state))]
pub async fn refresh_github_repos(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let listing = state.github_handler.refresh().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": listing.repos.len(),
        "repositories": listing.repos.as_ref(),
    })))
}

/// Server-rendered project cards; failures render the static failure markup.
#[instrument(skip(state))]
pub async fn github_repo_cards(state: web::Data<AppState>) -> HttpResponse {
    let grid = state.github_handler.grid().await;
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_grid(&grid, Utc::now()))
}
