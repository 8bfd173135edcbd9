use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as returned by `GET /users/{account}/repos`. Only the fields we
/// read are modelled; the rest of the upstream payload is ignored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubRepo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display-oriented shape served by `/api/github-repos`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RepoSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GithubRepo> for RepoSummary {
    fn from(repo: GithubRepo) -> Self {
        RepoSummary {
            id: repo.id,
            name: repo.name,
            description: repo.description,
            html_url: repo.html_url,
            homepage: repo.homepage.filter(|h| !h.trim().is_empty()),
            language: repo.language,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            topics: repo.topics.unwrap_or_default(),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

/// Drops forks and archived repositories, keeping upstream order.
pub fn showcase_repositories(repos: Vec<GithubRepo>) -> Vec<RepoSummary> {
    repos
        .into_iter()
        .filter(|repo| !repo.fork && !repo.archived)
        .map(RepoSummary::from)
        .collect()
}
