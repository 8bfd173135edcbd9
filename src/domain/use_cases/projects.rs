use std::{path::PathBuf, sync::Arc};

use actix_multipart::form::tempfile::TempFile;
use validator::Validate;

use crate::{
    entities::{
        github::RepoSummary,
        project::{Project, ProjectCreatedResponse, ProjectForm, ProjectListing, ProjectSyncResponse, SyncedProject},
    },
    errors::AppError,
    repositories::project::ProjectRepository,
    constants::UPLOADS_ROUTE,
    storage::uploads::{image_extension, UploadKind, UploadStore},
};

pub struct ProjectHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub uploads: UploadStore,
    pub fallback_path: PathBuf,
    pub max_image_bytes: usize,
}

impl ProjectHandler {
    pub fn new(
        project_repo: Arc<dyn ProjectRepository>,
        uploads: UploadStore,
        fallback_path: PathBuf,
        max_image_bytes: usize,
    ) -> Self {
        ProjectHandler { project_repo, uploads, fallback_path, max_image_bytes }
    }

    /// Lists projects newest first. When the database cannot be read the
    /// bundled fallback file is served instead, byte for byte.
    pub async fn list_projects(&self) -> Result<ProjectListing, AppError> {
        match self.project_repo.list_projects().await {
            Ok(projects) => Ok(ProjectListing::Live(projects)),
            Err(db_err) => {
                tracing::warn!("Project listing failed, using fallback file: {}", db_err);
                let bytes = self.read_fallback().await.map_err(|e| {
                    tracing::error!("Fallback projects file unusable: {}", e);
                    AppError::ProjectsUnavailable(db_err.to_string())
                })?;
                Ok(ProjectListing::Fallback(bytes))
            }
        }
    }

    async fn read_fallback(&self) -> Result<Vec<u8>, AppError> {
        let bytes = tokio::fs::read(&self.fallback_path).await?;
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .map_err(|e| AppError::InternalError(format!("fallback file is not JSON: {e}")))?;
        Ok(bytes)
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, AppError> {
        self.project_repo
            .get_project_by_id(id)
            .await?
            .ok_or(AppError::ProjectNotFound(id))
    }

    pub async fn create_project(
        &self,
        form: ProjectForm,
        image: Option<TempFile>,
    ) -> Result<ProjectCreatedResponse, AppError> {
        let form = form.normalized();
        form.validate()?;

        let uploaded = match image {
            Some(file) => Some(self.store_image(file).await?),
            None => None,
        };
        let insert = form.prepare_for_insert(uploaded.clone());

        let id = match self.project_repo.create_project(&insert).await {
            Ok(id) => id,
            Err(e) => {
                self.discard_uploaded(uploaded.as_deref()).await;
                return Err(e);
            }
        };
        tracing::info!(project_id = id, "Project created");

        Ok(ProjectCreatedResponse {
            success: true,
            id,
            message: "Project added successfully".to_string(),
        })
    }

    /// Replaces the project's fields. Without a new upload or image URL the
    /// existing image is kept.
    pub async fn update_project(
        &self,
        id: i64,
        form: ProjectForm,
        image: Option<TempFile>,
    ) -> Result<Project, AppError> {
        let form = form.normalized();
        form.validate()?;

        let existing = self.get_project(id).await?;

        let uploaded = match image {
            Some(file) => Some(self.store_image(file).await?),
            None => None,
        };
        let mut insert = form.prepare_for_insert(uploaded.clone());
        if insert.image.is_none() {
            insert.image = existing.image.clone();
        }

        let updated = match self.project_repo.update_project(id, &insert).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_uploaded(uploaded.as_deref()).await;
                return Err(e);
            }
        };
        if !updated {
            self.discard_uploaded(uploaded.as_deref()).await;
            return Err(AppError::ProjectNotFound(id));
        }

        if existing.image != insert.image {
            self.discard_uploaded(existing.image.as_deref()).await;
        }

        self.get_project(id).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let project = self.get_project(id).await?;
        if project.is_github_sync {
            return Err(AppError::GithubSyncedProject(id));
        }

        if !self.project_repo.delete_project(id).await? {
            return Err(AppError::ProjectNotFound(id));
        }
        self.discard_uploaded(project.image.as_deref()).await;
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }

    /// Upserts the showcased repositories into the projects table.
    pub async fn sync_from_github(&self, repos: &[RepoSummary]) -> Result<ProjectSyncResponse, AppError> {
        let mut synced = 0;
        for repo in repos {
            self.project_repo
                .upsert_synced_project(&SyncedProject::from(repo))
                .await?;
            synced += 1;
        }
        tracing::info!(synced, "GitHub repositories synced into projects");

        Ok(ProjectSyncResponse { success: true, synced })
    }

    async fn store_image(&self, file: TempFile) -> Result<String, AppError> {
        if file.size > self.max_image_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Image exceeds {} bytes",
                self.max_image_bytes
            )));
        }
        let declared = file.content_type.as_ref().map(|m| m.essence_str());
        let extension = image_extension(declared, file.file.path())?;
        let stored = self
            .uploads
            .save_from_path(UploadKind::ProjectImage, extension, file.file.path())
            .await?;

        Ok(format!("{UPLOADS_ROUTE}/{}", stored.filename))
    }

    /// Deletes a file this service uploaded; external image URLs are left alone.
    async fn discard_uploaded(&self, image_url: Option<&str>) {
        let stored_name = image_url
            .and_then(|url| url.strip_prefix(UPLOADS_ROUTE))
            .and_then(|rest| rest.strip_prefix('/'));
        if let Some(name) = stored_name {
            self.uploads.remove(name).await;
        }
    }
}
