use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    entities::resume::{Resume, ResumeInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxResumeRepo,
};

/// Advisory lock key serializing every change of the current-resume flag.
const CURRENT_RESUME_LOCK: i64 = 0x7265_7375_6d65;

const RESUME_COLUMNS: &str = r#"
    id, filename, original_name, file_path, file_url, file_size,
    mime_type, is_current, uploaded_at, updated_at
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Inserts a resume and makes it the only current one, atomically.
    async fn insert_current(&self, resume: &ResumeInsert) -> Result<Resume, AppError>;

    /// Moves the current flag to `id`. Returns `false` when `id` does not exist,
    /// in which case the flag is left where it was.
    async fn set_current(&self, id: i64) -> Result<bool, AppError>;

    async fn get_flagged_current(&self) -> Result<Option<Resume>, AppError>;
    async fn get_most_recent(&self) -> Result<Option<Resume>, AppError>;
    async fn get_by_filename(&self, filename: &str) -> Result<Option<Resume>, AppError>;
    async fn list_resumes(&self) -> Result<Vec<Resume>, AppError>;
}

impl SqlxResumeRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxResumeRepo { pool }
    }

    async fn lock_current_flag(tx: &mut Transaction<'_, Postgres>) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CURRENT_RESUME_LOCK)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn clear_current_flag(tx: &mut Transaction<'_, Postgres>) -> Result<(), AppError> {
        sqlx::query("UPDATE resumes SET is_current = FALSE, updated_at = NOW() WHERE is_current")
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ResumeRepository for SqlxResumeRepo {
    async fn insert_current(&self, resume: &ResumeInsert) -> Result<Resume, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_current_flag(&mut tx).await?;
        Self::clear_current_flag(&mut tx).await?;

        let inserted = sqlx::query_as::<_, Resume>(&format!(
            r#"
            INSERT INTO resumes (filename, original_name, file_path, file_url, file_size, mime_type, is_current)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(&resume.filename)
        .bind(&resume.original_name)
        .bind(&resume.file_path)
        .bind(&resume.file_url)
        .bind(resume.file_size)
        .bind(&resume.mime_type)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    async fn set_current(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_current_flag(&mut tx).await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM resumes WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::clear_current_flag(&mut tx).await?;
        sqlx::query("UPDATE resumes SET is_current = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn get_flagged_current(&self) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE is_current ORDER BY uploaded_at DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(resume)
    }

    async fn get_most_recent(&self) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes ORDER BY uploaded_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(resume)
    }

    async fn get_by_filename(&self, filename: &str) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE filename = $1"
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resume)
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>, AppError> {
        let resumes = sqlx::query_as::<_, Resume>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes ORDER BY uploaded_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(resumes)
    }
}
