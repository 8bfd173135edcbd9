use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RESUME_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Resume {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_url: String,
    pub file_size: i64,
    pub mime_type: String,
    pub is_current: bool,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeInsert {
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_url: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// A file part read from a multipart body, held in memory until validated.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// How a stored resume should be handed to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeUploadResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
    pub filename: String,
    pub file_url: String,
    pub file_path: String,
    pub original_name: String,
}

/// `GET /api/resume/current`: the row's fields flattened, plus a note on how it was picked.
#[derive(Debug, Serialize)]
pub struct CurrentResumeResponse {
    #[serde(flatten)]
    pub resume: Resume,
    pub message: String,
}

/// `GET /api/resume`: the shape the page's resume panel reads.
#[derive(Debug, Serialize)]
pub struct ResumeInfoResponse {
    pub success: bool,
    pub resume: Resume,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub success: bool,
    pub count: usize,
    pub resumes: Vec<Resume>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetCurrentResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
}

/// A stored resume loaded for viewing or download.
#[derive(Debug)]
pub struct ResumeFile {
    pub resume: Resume,
    pub bytes: Vec<u8>,
}

/// Result of picking the resume to serve.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentResume {
    Flagged(Resume),
    MostRecent(Resume),
}

impl CurrentResume {
    pub fn into_inner(self) -> Resume {
        match self {
            CurrentResume::Flagged(r) | CurrentResume::MostRecent(r) => r,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CurrentResume::Flagged(_) => "Current resume retrieved successfully",
            CurrentResume::MostRecent(_) => "Showing most recent resume (no current resume marked)",
        }
    }
}

/// Quotes a filename for `Content-Disposition`, with an RFC 5987 form for non-ASCII names.
pub fn attachment_header(original_name: &str) -> String {
    let ascii: String = original_name
        .chars()
        .map(|c| if c.is_ascii() && c != '"' && c != '\\' && !c.is_ascii_control() { c } else { '_' })
        .collect();
    if ascii == original_name {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(original_name)
        )
    }
}
