use std::sync::Arc;

use zeroize::Zeroizing;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{db, github, limiter, mail, storage, utils};

use github::client::RepositorySource;
use limiter::rate_limiter::SlidingWindowLimiter;
use mail::mailer::Mailer;
use shared_repos::SharedRepositories;
use storage::uploads::UploadStore;
use use_cases::{contact::ContactHandler, github::GithubHandler, projects::ProjectHandler, resume::ResumeHandler};

pub struct AppState {
    pub project_handler: ProjectHandler,
    pub contact_handler: ContactHandler,
    pub resume_handler: ResumeHandler,
    pub github_handler: Arc<GithubHandler>,
    pub uploads: UploadStore,
    pub admin_token: Option<Zeroizing<String>>,
    pub trust_x_forwarded_for: bool,
    pub smtp_configured: bool,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        repos: SharedRepositories,
        mailer: Arc<dyn Mailer>,
        github_source: Arc<dyn RepositorySource>,
    ) -> Self {
        let uploads = UploadStore::new(&config.upload_dir, &config.public_base_url);

        let project_handler = ProjectHandler::new(
            repos.project_repo,
            uploads.clone(),
            config.fallback_projects_path.clone(),
            config.max_image_bytes,
        );
        let contact_handler = ContactHandler::new(
            repos.message_repo,
            mailer.clone(),
            SlidingWindowLimiter::new(config.contact_rate_limit, config.contact_rate_window()),
            config.admin_email.clone(),
            config.owner_name.clone(),
        );
        let resume_handler = ResumeHandler::new(repos.resume_repo, uploads.clone(), config.max_resume_bytes);
        let github_handler = Arc::new(GithubHandler::new(github_source, config.github_cache_ttl()));

        AppState {
            project_handler,
            contact_handler,
            resume_handler,
            github_handler,
            uploads,
            admin_token: config.admin_token.clone().map(Zeroizing::new),
            trust_x_forwarded_for: config.trust_x_forwarded_for,
            smtp_configured: mailer.is_enabled(),
        }
    }
}
