use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use derive_more::Display;
use infer::Infer;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use uuid::Uuid;

use crate::{constants::UPLOADS_ROUTE, errors::AppError};

/// Names produced by `generate_filename`; anything else is never served.
static STORED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(resume|project)-\d+-[0-9a-f]{8}\.[a-z0-9]{1,5}$").expect("valid regex")
});

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    ProjectImage,
}

impl UploadKind {
    fn prefix(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resume",
            UploadKind::ProjectImage => "project",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    /// Path under the configured upload directory, as recorded in the database.
    pub file_path: String,
    pub size: u64,
}

#[derive(Debug, Display)]
pub enum UploadError {
    #[display("Invalid stored filename: {_0}")]
    InvalidName(String),

    #[display("Expected {expected}, detected {detected}")]
    ContentMismatch { expected: &'static str, detected: String },

    #[display("Failed to write file: {_0}")]
    Io(io::Error),
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for UploadError {
    fn from(e: io::Error) -> Self {
        UploadError::Io(e)
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::InvalidName(name) => AppError::NotFound(name),
            mismatch @ UploadError::ContentMismatch { .. } => AppError::InvalidFileType(mismatch.to_string()),
            UploadError::Io(io) => AppError::IoError(io.to_string()),
        }
    }
}

/// Local directory holding uploaded resumes and project images.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_base_url: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        UploadStore {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<prefix>-<unix millis>-<first 8 hex of a v4 uuid>.<ext>`
    pub fn generate_filename(kind: UploadKind, extension: &str) -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.{}",
            kind.prefix(),
            Utc::now().timestamp_millis(),
            &uuid[..8],
            extension.to_ascii_lowercase()
        )
    }

    pub fn is_valid_filename(name: &str) -> bool {
        STORED_NAME.is_match(name)
    }

    /// Resolves a stored name to its path; `None` for names we never generate.
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        Self::is_valid_filename(name).then(|| self.dir.join(name))
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}{UPLOADS_ROUTE}/{name}", self.public_base_url)
    }

    /// Location recorded alongside a stored file, under the configured directory.
    pub fn stored_path(&self, name: &str) -> String {
        self.dir.join(name).to_string_lossy().into_owned()
    }

    /// Writes an in-memory upload under a fresh name.
    pub async fn save(&self, kind: UploadKind, extension: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        let filename = Self::generate_filename(kind, extension);
        let path = self.dir.join(&filename);

        fs::write(&path, bytes).await?;
        tracing::info!(filename = %filename, size = bytes.len(), "Stored upload");

        Ok(StoredFile {
            file_path: self.stored_path(&filename),
            filename,
            size: bytes.len() as u64,
        })
    }

    /// Copies a spooled multipart file into the store.
    pub async fn save_from_path(&self, kind: UploadKind, extension: &str, source: &Path) -> Result<StoredFile, UploadError> {
        let filename = Self::generate_filename(kind, extension);
        let path = self.dir.join(&filename);

        let size = fs::copy(source, &path).await?;
        tracing::info!(filename = %filename, size, "Stored upload");

        Ok(StoredFile {
            file_path: self.stored_path(&filename),
            filename,
            size,
        })
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, UploadError> {
        let path = self
            .path_for(name)
            .ok_or_else(|| UploadError::InvalidName(name.to_string()))?;
        Ok(fs::read(path).await?)
    }

    /// Best-effort removal, used to undo a write whose row never landed.
    pub async fn remove(&self, name: &str) {
        if let Some(path) = self.path_for(name) {
            if let Err(e) = fs::remove_file(&path).await {
                tracing::warn!(filename = %name, "Failed to remove upload: {}", e);
            }
        }
    }
}

/// True when the bytes start with a PDF signature.
pub fn sniff_pdf(bytes: &[u8]) -> bool {
    Infer::new()
        .get(bytes)
        .is_some_and(|t| t.mime_type() == "application/pdf")
}

/// Checks a spooled image upload and returns the extension to store it under.
/// The declared type must be `image/*` and the content must sniff as a raster
/// image; the detected extension wins over whatever the client named the file.
pub fn image_extension(declared_type: Option<&str>, path: &Path) -> Result<&'static str, UploadError> {
    let declared = declared_type.unwrap_or_default();
    if !declared.starts_with("image/") {
        return Err(UploadError::ContentMismatch {
            expected: "image/*",
            detected: if declared.is_empty() { "unknown".into() } else { declared.to_string() },
        });
    }

    match Infer::new().get_from_path(path)? {
        Some(kind) if IMAGE_EXTENSIONS.contains(&kind.extension()) => Ok(kind.extension()),
        Some(kind) => Err(UploadError::ContentMismatch {
            expected: "image/*",
            detected: kind.mime_type().to_string(),
        }),
        None => Err(UploadError::ContentMismatch {
            expected: "image/*",
            detected: "unknown".into(),
        }),
    }
}

/// Content type for serving a stored file, from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
