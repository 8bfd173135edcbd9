use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entities::github::RepoSummary;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 255;
const MAX_DESCRIPTION_LENGTH: u64 = 5000;
const MAX_URL_LENGTH: u64 = 500;
const MAX_TAGS_LENGTH: u64 = 1000;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub tags: Option<String>,
    pub language: Option<String>,
    pub stars: i32,
    pub is_featured: bool,
    pub is_github_sync: bool,
    pub github_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Tags are stored as one comma separated string.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| t.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInsert {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub tags: Option<String>,
}

/// A repository as it is upserted into `projects` by a GitHub sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedProject {
    pub github_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub github_url: String,
    pub live_url: Option<String>,
    pub tags: Option<String>,
    pub language: Option<String>,
    pub stars: i32,
}

impl From<&RepoSummary> for SyncedProject {
    fn from(repo: &RepoSummary) -> Self {
        SyncedProject {
            github_id: repo.id,
            title: repo.name.clone(),
            description: repo.description.clone(),
            github_url: repo.html_url.clone(),
            live_url: repo.homepage.clone().filter(|h| !h.is_empty()),
            tags: (!repo.topics.is_empty()).then(|| repo.topics.join(",")),
            language: repo.language.clone(),
            stars: i32::try_from(repo.stargazers_count).unwrap_or(i32::MAX),
        }
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectCreatedResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectSyncResponse {
    pub success: bool,
    pub synced: usize,
}

/// What `GET /api/projects` serves: live rows, or the fallback file's exact bytes.
#[derive(Debug)]
pub enum ProjectListing {
    Live(Vec<Project>),
    Fallback(Vec<u8>),
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProjectForm {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title is required"))]
    pub title: String,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    /// Image URL, used when no file is uploaded.
    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_link"))]
    pub image: Option<String>,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_link"))]
    pub github_url: Option<String>,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_link"))]
    pub live_url: Option<String>,

    #[validate(length(max = MAX_TAGS_LENGTH))]
    pub tags: Option<String>,
}

#[derive(Debug, MultipartForm)]
pub struct ProjectUpload {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub image: Option<Text<String>>,
    pub github_url: Option<Text<String>>,
    pub live_url: Option<Text<String>>,
    pub tags: Option<Text<String>>,

    #[multipart(rename = "projectImage")]
    pub project_image: Option<TempFile>,
}

impl ProjectUpload {
    /// Splits the multipart body into the text form and the optional image file.
    pub fn into_parts(self) -> (ProjectForm, Option<TempFile>) {
        let text = |field: Option<Text<String>>| field.map(|t| t.into_inner());
        let form = ProjectForm {
            title: text(self.title).unwrap_or_default(),
            description: text(self.description),
            image: text(self.image),
            github_url: text(self.github_url),
            live_url: text(self.live_url),
            tags: text(self.tags),
        };
        // Browsers send an empty part when the file input is left blank.
        let image = self.project_image.filter(|f| f.size > 0);
        (form, image)
    }
}

impl ProjectForm {
    /// Trims every field and turns blank optionals into `None`.
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        ProjectForm {
            title: self.title.trim().to_string(),
            description: clean(self.description),
            image: clean(self.image),
            github_url: clean(self.github_url),
            live_url: clean(self.live_url),
            tags: clean(self.tags),
        }
    }

    pub fn prepare_for_insert(&self, uploaded_image: Option<String>) -> ProjectInsert {
        ProjectInsert {
            title: self.title.clone(),
            description: self.description.clone(),
            image: uploaded_image.or_else(|| self.image.clone()),
            github_url: self.github_url.clone(),
            live_url: self.live_url.clone(),
            tags: self.tags.clone(),
        }
    }
}

// ───── Helper Functions ─────────────────────────────────────────────

fn validate_link(link: &str) -> Result<(), ValidationError> {
    if link.starts_with('/') || url::Url::parse(link).is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_url");
    err.message = Some("Must be an absolute URL or a site path".into());
    Err(err)
}
