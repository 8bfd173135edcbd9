use std::sync::Arc;

use crate::repositories::{
    message::MessageRepository,
    project::ProjectRepository,
    resume::ResumeRepository,
    sqlx_repo::{SqlxMessageRepo, SqlxProjectRepo, SqlxResumeRepo},
};

/// Repository handles shared by the use-case handlers.
#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub message_repo: Arc<dyn MessageRepository>,
    pub resume_repo: Arc<dyn ResumeRepository>,
}

impl SharedRepositories {
    pub fn new(pool: sqlx::PgPool) -> Self {
        let project_repo = SqlxProjectRepo::new(pool.clone());
        let message_repo = SqlxMessageRepo::new(pool.clone());
        let resume_repo = SqlxResumeRepo::new(pool);

        SharedRepositories {
            project_repo: Arc::new(project_repo),
            message_repo: Arc::new(message_repo),
            resume_repo: Arc::new(resume_repo),
        }
    }
}
