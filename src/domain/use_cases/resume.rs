use std::{io, sync::Arc};

use crate::{
    entities::resume::{
        CurrentResume, IncomingFile, ResumeFile, ResumeInsert, ResumeListResponse, ResumeUploadResponse,
        SetCurrentResponse, RESUME_MIME_TYPE,
    },
    errors::AppError,
    repositories::resume::ResumeRepository,
    storage::uploads::{sniff_pdf, UploadError, UploadKind, UploadStore},
};

pub struct ResumeHandler {
    pub resume_repo: Arc<dyn ResumeRepository>,
    pub uploads: UploadStore,
    pub max_resume_bytes: usize,
}

impl ResumeHandler {
    pub fn new(resume_repo: Arc<dyn ResumeRepository>, uploads: UploadStore, max_resume_bytes: usize) -> Self {
        ResumeHandler { resume_repo, uploads, max_resume_bytes }
    }

    /// Stores a PDF and makes it the current resume. Nothing touches the disk
    /// until the type, size and PDF signature have all been checked, and the
    /// file is removed again if the row cannot be written.
    pub async fn upload(&self, file: IncomingFile) -> Result<ResumeUploadResponse, AppError> {
        Self::check_declared_type(file.content_type.as_deref())?;
        if file.bytes.len() > self.max_resume_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Resume exceeds {} bytes",
                self.max_resume_bytes
            )));
        }
        if file.bytes.is_empty() {
            return Err(AppError::MissingFile("resume".to_string()));
        }
        if !sniff_pdf(&file.bytes) {
            return Err(AppError::InvalidFileType("File content is not a PDF".to_string()));
        }

        let stored = self.uploads.save(UploadKind::Resume, "pdf", &file.bytes).await?;
        let insert = ResumeInsert {
            file_url: self.uploads.public_url(&stored.filename),
            file_path: stored.file_path.clone(),
            file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
            mime_type: RESUME_MIME_TYPE.to_string(),
            original_name: file.original_name,
            filename: stored.filename.clone(),
        };

        let resume = match self.resume_repo.insert_current(&insert).await {
            Ok(resume) => resume,
            Err(e) => {
                self.uploads.remove(&stored.filename).await;
                return Err(e);
            }
        };
        tracing::info!(resume_id = resume.id, filename = %resume.filename, "Resume uploaded and marked current");

        Ok(ResumeUploadResponse {
            success: true,
            message: "Resume uploaded successfully".to_string(),
            id: resume.id,
            filename: resume.filename,
            file_url: resume.file_url,
            file_path: resume.file_path,
            original_name: resume.original_name,
        })
    }

    /// Declared type check, shared with the multipart reader so a wrong type
    /// is refused before the body is read.
    pub fn check_declared_type(content_type: Option<&str>) -> Result<(), AppError> {
        match content_type {
            Some(RESUME_MIME_TYPE) => Ok(()),
            other => Err(AppError::InvalidFileType(format!(
                "Only PDF files are allowed, got {}",
                other.unwrap_or("no content type")
            ))),
        }
    }

    /// The flagged resume, else the most recent upload.
    pub async fn current(&self) -> Result<CurrentResume, AppError> {
        if let Some(resume) = self.resume_repo.get_flagged_current().await? {
            return Ok(CurrentResume::Flagged(resume));
        }
        self.resume_repo
            .get_most_recent()
            .await?
            .map(CurrentResume::MostRecent)
            .ok_or_else(|| AppError::ResumeNotFound("no resume has been uploaded".to_string()))
    }

    pub async fn list(&self) -> Result<ResumeListResponse, AppError> {
        let resumes = self.resume_repo.list_resumes().await?;
        Ok(ResumeListResponse {
            success: true,
            count: resumes.len(),
            resumes,
        })
    }

    pub async fn set_current(&self, id: i64) -> Result<SetCurrentResponse, AppError> {
        if !self.resume_repo.set_current(id).await? {
            return Err(AppError::ResumeNotFound(format!("id {id}")));
        }
        tracing::info!(resume_id = id, "Current resume changed");

        Ok(SetCurrentResponse {
            success: true,
            id,
            message: "Current resume updated".to_string(),
        })
    }

    /// Loads a stored resume by its generated filename.
    pub async fn open(&self, filename: &str) -> Result<ResumeFile, AppError> {
        let not_found = || AppError::ResumeNotFound(filename.to_string());

        if !filename.starts_with("resume-") || !UploadStore::is_valid_filename(filename) {
            return Err(not_found());
        }
        let resume = self
            .resume_repo
            .get_by_filename(filename)
            .await?
            .ok_or_else(not_found)?;

        let bytes = match self.uploads.read(filename).await {
            Ok(bytes) => bytes,
            Err(UploadError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(filename, "Resume row exists but its file is missing");
                return Err(not_found());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ResumeFile { resume, bytes })
    }
}
