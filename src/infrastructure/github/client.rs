use std::time::Duration;

use async_trait::async_trait;
use derive_more::Display;
use reqwest::{header, Client, StatusCode};
use zeroize::Zeroizing;

use crate::{entities::github::GithubRepo, settings::AppConfig};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Display)]
pub enum GithubError {
    #[display("request failed: {_0}")]
    Request(String),

    #[display("upstream responded with {_0}")]
    Status(StatusCode),

    #[display("rate limit exceeded")]
    RateLimited,

    #[display("unexpected payload: {_0}")]
    Decode(String),
}

impl std::error::Error for GithubError {}

/// Anything able to list the account's repositories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn fetch_repositories(&self) -> Result<Vec<GithubRepo>, GithubError>;
}

pub struct GithubClient {
    http: Client,
    api_url: String,
    username: String,
    per_page: u8,
    token: Option<Zeroizing<String>>,
}

impl GithubClient {
    pub fn new(config: &AppConfig) -> Result<Self, GithubError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.github_timeout_secs))
            .user_agent(format!("{}/{}", config.name, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GithubError::Request(e.to_string()))?;

        Ok(GithubClient {
            http,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            username: config.github_username.clone(),
            per_page: config.github_per_page,
            token: config.github_token.clone().map(Zeroizing::new),
        })
    }

    fn repos_url(&self) -> String {
        format!(
            "{}/users/{}/repos?sort=updated&per_page={}&type=owner",
            self.api_url,
            urlencoding::encode(&self.username),
            self.per_page
        )
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn fetch_repositories(&self) -> Result<Vec<GithubRepo>, GithubError> {
        let mut request = self
            .http
            .get(self.repos_url())
            .header(header::ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("token {}", token.as_str()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| GithubError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == "0");
            if exhausted || status == StatusCode::TOO_MANY_REQUESTS {
                return Err(GithubError::RateLimited);
            }
        }
        if !status.is_success() {
            return Err(GithubError::Status(status));
        }

        response
            .json::<Vec<GithubRepo>>()
            .await
            .map_err(|e| GithubError::Decode(e.to_string()))
    }
}
