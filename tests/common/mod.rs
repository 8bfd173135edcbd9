#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use tempfile::TempDir;

use portfolio_site::{
    entities::{
        github::GithubRepo,
        message::{Message, MessageInsert, MessageStatus},
        project::{Project, ProjectInsert, SyncedProject},
        resume::{Resume, ResumeInsert},
    },
    errors::AppError,
    github::client::{GithubError, RepositorySource},
    mail::mailer::{MailError, Mailer, OutgoingEmail},
    repositories::{message::MessageRepository, project::ProjectRepository, resume::ResumeRepository},
    settings::AppConfig,
    shared_repos::SharedRepositories,
    AppState,
};

pub const ADMIN_TOKEN: &str = "integration-admin-token";
pub const BASE_URL: &str = "https://portfolio.test";

/// Builds the application the same way `main` does, minus CORS and logging.
macro_rules! spawn_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(portfolio_site::middlewares::admin::AdminAuth)
                .configure(portfolio_site::routes::configure_routes),
        )
        .await
    };
}

fn db_down() -> AppError {
    AppError::DatabaseError("connection refused".to_string())
}

// ───── Projects ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryProjects {
    pub rows: Mutex<Vec<Project>>,
    pub offline: bool,
}

impl InMemoryProjects {
    pub fn offline() -> Self {
        InMemoryProjects { offline: true, ..Default::default() }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.offline { Err(db_down()) } else { Ok(()) }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn check_connection(&self) -> Result<(), AppError> {
        self.check()
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>, AppError> {
        self.check()?;
        Ok(self.rows.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<i64, AppError> {
        self.check()?;
        let mut rows = self.rows.lock();
        let id = rows.len() as i64 + 1;
        let now = Utc::now();
        rows.push(Project {
            id,
            title: project.title.clone(),
            description: project.description.clone(),
            image: project.image.clone(),
            github_url: project.github_url.clone(),
            live_url: project.live_url.clone(),
            tags: project.tags.clone(),
            language: None,
            stars: 0,
            is_featured: false,
            is_github_sync: false,
            github_id: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn update_project(&self, id: i64, project: &ProjectInsert) -> Result<bool, AppError> {
        self.check()?;
        let mut rows = self.rows.lock();
        let Some(row) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        row.title = project.title.clone();
        row.description = project.description.clone();
        row.image = project.image.clone();
        row.github_url = project.github_url.clone();
        row.live_url = project.live_url.clone();
        row.tags = project.tags.clone();
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_project(&self, id: i64) -> Result<bool, AppError> {
        self.check()?;
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn upsert_synced_project(&self, project: &SyncedProject) -> Result<i64, AppError> {
        self.check()?;
        let mut rows = self.rows.lock();
        let now = Utc::now();
        if let Some(row) = rows.iter_mut().find(|p| p.github_id == Some(project.github_id)) {
            row.title = project.title.clone();
            row.stars = project.stars;
            row.updated_at = now;
            return Ok(row.id);
        }
        let id = rows.len() as i64 + 1;
        rows.push(Project {
            id,
            title: project.title.clone(),
            description: project.description.clone(),
            image: None,
            github_url: Some(project.github_url.clone()),
            live_url: project.live_url.clone(),
            tags: project.tags.clone(),
            language: project.language.clone(),
            stars: project.stars,
            is_featured: false,
            is_github_sync: true,
            github_id: Some(project.github_id),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }
}

// ───── Messages ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryMessages {
    pub rows: Mutex<Vec<Message>>,
    pub offline: bool,
}

impl InMemoryMessages {
    pub fn offline() -> Self {
        InMemoryMessages { offline: true, ..Default::default() }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn create_message(&self, msg: &MessageInsert) -> Result<i64, AppError> {
        if self.offline {
            return Err(db_down());
        }
        let mut rows = self.rows.lock();
        let id = rows.len() as i64 + 1;
        let now = Utc::now();
        rows.push(Message {
            id,
            name: msg.name.clone(),
            email: msg.email.clone(),
            subject: msg.subject.clone(),
            message: msg.message.clone(),
            status: MessageStatus::New,
            ip_address: msg.ip_address.clone(),
            user_agent: msg.user_agent.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        if self.offline {
            return Err(db_down());
        }
        let mut rows = self.rows.lock().clone();
        rows.reverse();
        Ok(rows)
    }

    async fn update_status(&self, id: i64, status: MessageStatus) -> Result<bool, AppError> {
        if self.offline {
            return Err(db_down());
        }
        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|m| m.id == id) {
            Some(row) => {
                row.status = status;
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ───── Resumes ──────────────────────────────────────────────────────

/// Keeps the single-current invariant the database enforces with its
/// partial unique index.
#[derive(Default)]
pub struct InMemoryResumes {
    pub rows: Mutex<Vec<Resume>>,
}

impl InMemoryResumes {
    pub fn current_count(&self) -> usize {
        self.rows.lock().iter().filter(|r| r.is_current).count()
    }
}

#[async_trait]
impl ResumeRepository for InMemoryResumes {
    async fn insert_current(&self, resume: &ResumeInsert) -> Result<Resume, AppError> {
        let mut rows = self.rows.lock();
        rows.iter_mut().for_each(|r| r.is_current = false);

        // Distinct timestamps keep "most recent" deterministic.
        let uploaded_at = Utc::now() + Duration::milliseconds(rows.len() as i64);
        let row = Resume {
            id: rows.len() as i64 + 1,
            filename: resume.filename.clone(),
            original_name: resume.original_name.clone(),
            file_path: resume.file_path.clone(),
            file_url: resume.file_url.clone(),
            file_size: resume.file_size,
            mime_type: resume.mime_type.clone(),
            is_current: true,
            uploaded_at,
            updated_at: uploaded_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn set_current(&self, id: i64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock();
        if !rows.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        rows.iter_mut().for_each(|r| r.is_current = r.id == id);
        Ok(true)
    }

    async fn get_flagged_current(&self) -> Result<Option<Resume>, AppError> {
        Ok(self.rows.lock().iter().find(|r| r.is_current).cloned())
    }

    async fn get_most_recent(&self) -> Result<Option<Resume>, AppError> {
        Ok(self.rows.lock().iter().max_by_key(|r| r.uploaded_at).cloned())
    }

    async fn get_by_filename(&self, filename: &str) -> Result<Option<Resume>, AppError> {
        Ok(self.rows.lock().iter().find(|r| r.filename == filename).cloned())
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>, AppError> {
        let mut rows = self.rows.lock().clone();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(rows)
    }
}

// ───── Mail and GitHub stubs ────────────────────────────────────────

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().push(email);
        Ok(())
    }
}

pub struct StaticRepos {
    pub repos: Option<Vec<GithubRepo>>,
    pub calls: Mutex<usize>,
}

impl StaticRepos {
    pub fn new(repos: Vec<GithubRepo>) -> Self {
        StaticRepos { repos: Some(repos), calls: Mutex::new(0) }
    }

    pub fn failing() -> Self {
        StaticRepos { repos: None, calls: Mutex::new(0) }
    }
}

#[async_trait]
impl RepositorySource for StaticRepos {
    async fn fetch_repositories(&self) -> Result<Vec<GithubRepo>, GithubError> {
        *self.calls.lock() += 1;
        self.repos
            .clone()
            .ok_or_else(|| GithubError::Request("connection reset".to_string()))
    }
}

pub fn github_repo(id: i64, fork: bool, archived: bool) -> GithubRepo {
    let ts = "2025-01-15T08:30:00Z".parse().unwrap();
    GithubRepo {
        id,
        name: format!("repo-{id}"),
        description: Some(format!("Repository number {id}")),
        html_url: format!("https://github.com/Anita-Boke/repo-{id}"),
        homepage: None,
        language: Some("JavaScript".into()),
        stargazers_count: id as u32,
        forks_count: 0,
        topics: Some(vec!["portfolio".into()]),
        fork,
        archived,
        private: false,
        created_at: ts,
        updated_at: ts,
    }
}

// ───── Application state ────────────────────────────────────────────

pub struct TestApp {
    pub state: actix_web::web::Data<AppState>,
    pub projects: Arc<InMemoryProjects>,
    pub messages: Arc<InMemoryMessages>,
    pub resumes: Arc<InMemoryResumes>,
    pub mailer: Arc<RecordingMailer>,
    pub github: Arc<StaticRepos>,
    pub dir: TempDir,
}

pub struct TestAppBuilder {
    projects: InMemoryProjects,
    messages: InMemoryMessages,
    github: StaticRepos,
    admin_token: Option<String>,
    fallback: Option<Vec<u8>>,
    max_resume_bytes: Option<usize>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        TestAppBuilder {
            projects: InMemoryProjects::default(),
            messages: InMemoryMessages::default(),
            github: StaticRepos::new(Vec::new()),
            admin_token: Some(ADMIN_TOKEN.to_string()),
            fallback: None,
            max_resume_bytes: None,
        }
    }

    pub fn projects(mut self, projects: InMemoryProjects) -> Self {
        self.projects = projects;
        self
    }

    pub fn messages(mut self, messages: InMemoryMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn github(mut self, github: StaticRepos) -> Self {
        self.github = github;
        self
    }

    pub fn fallback_projects(mut self, bytes: &[u8]) -> Self {
        self.fallback = Some(bytes.to_vec());
        self
    }

    pub fn max_resume_bytes(mut self, limit: usize) -> Self {
        self.max_resume_bytes = Some(limit);
        self
    }

    pub fn build(self) -> TestApp {
        let dir = tempfile::tempdir().expect("tempdir");
        let fallback_path = dir.path().join("projects.json");
        if let Some(bytes) = &self.fallback {
            std::fs::write(&fallback_path, bytes).expect("write fallback");
        }
        let upload_dir = dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("create upload dir");

        let defaults = AppConfig::default();
        let config = AppConfig {
            database_url: "postgres://unused/portfolio_test".into(),
            public_base_url: BASE_URL.into(),
            upload_dir,
            fallback_projects_path: fallback_path,
            admin_token: self.admin_token,
            admin_email: Some("owner@portfolio.test".into()),
            max_resume_bytes: self.max_resume_bytes.unwrap_or(defaults.max_resume_bytes),
            ..defaults
        };

        let projects = Arc::new(self.projects);
        let messages = Arc::new(self.messages);
        let resumes = Arc::new(InMemoryResumes::default());
        let mailer = Arc::new(RecordingMailer::default());
        let github = Arc::new(self.github);

        let repos = SharedRepositories {
            project_repo: projects.clone(),
            message_repo: messages.clone(),
            resume_repo: resumes.clone(),
        };
        let state = actix_web::web::Data::new(AppState::new(
            &config,
            repos,
            mailer.clone(),
            github.clone(),
        ));

        TestApp { state, projects, messages, resumes, mailer, github, dir }
    }
}

impl TestApp {
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn stored_files(&self) -> Vec<String> {
        list_dir(&self.upload_dir())
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {ADMIN_TOKEN}"))
}

/// A minimal but well-formed PDF padded to `size` bytes.
pub fn pdf_bytes(size: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n".to_vec();
    bytes.resize(size.saturating_sub(6).max(bytes.len()), b' ');
    bytes.extend_from_slice(b"\n%%EOF");
    bytes
}

pub const MULTIPART_BOUNDARY: &str = "----portfolio-test-boundary";

/// Encodes a single file part as `multipart/form-data`.
pub fn multipart_file(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"), body)
}

/// Encodes text fields followed by an optional file part.
pub fn multipart_form(texts: &[(&str, &str)], file: Option<(&str, &str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((field, filename, content_type, bytes)) = file {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"), body)
}

/// PNG signature and an IHDR chunk header, enough for content sniffing.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13]);
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
    bytes.extend_from_slice(&[0x1F, 0x15, 0xC4, 0x89]);
    bytes
}
