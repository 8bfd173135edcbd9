use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::project::{Project, ProjectInsert, SyncedProject},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = r#"
    id, title, description, image, github_url, live_url, tags,
    language, stars, is_featured, is_github_sync, github_id,
    created_at, updated_at
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>, AppError>;
    async fn create_project(&self, project: &ProjectInsert) -> Result<i64, AppError>;
    async fn update_project(&self, id: i64, project: &ProjectInsert) -> Result<bool, AppError>;
    async fn delete_project(&self, id: i64) -> Result<bool, AppError>;

    /// Inserts or refreshes a GitHub-backed project keyed by its repository id.
    async fn upsert_synced_project(&self, project: &SyncedProject) -> Result<i64, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO projects (title, description, image, github_url, live_url, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_project(&self, id: i64, project: &ProjectInsert) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title = $1,
                description = $2,
                image = $3,
                github_url = $4,
                live_url = $5,
                tags = $6,
                updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.tags)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_project(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_synced_project(&self, project: &SyncedProject) -> Result<i64, AppError> {
        // Local edits to the image and featured flag survive a re-sync.
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO projects (
                title, description, github_url, live_url, tags,
                language, stars, is_github_sync, github_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8)
            ON CONFLICT (github_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                github_url = EXCLUDED.github_url,
                live_url = EXCLUDED.live_url,
                tags = EXCLUDED.tags,
                language = EXCLUDED.language,
                stars = EXCLUDED.stars,
                is_github_sync = TRUE,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.tags)
        .bind(&project.language)
        .bind(project.stars)
        .bind(project.github_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
