use std::{sync::Arc, time::Duration};

use crate::{
    entities::github::{showcase_repositories, RepoSummary},
    errors::AppError,
    github::{
        cache::RepoCache,
        client::{GithubError, RepositorySource},
    },
    utils::render::GridState,
};

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Cache,
    Upstream,
    /// Upstream failed and an expired snapshot was served.
    Stale,
}

impl ListingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingSource::Cache => "cache",
            ListingSource::Upstream => "github",
            ListingSource::Stale => "stale-cache",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepoListing {
    pub repos: Arc<Vec<RepoSummary>>,
    pub source: ListingSource,
}

pub struct GithubHandler {
    pub source: Arc<dyn RepositorySource>,
    pub cache: RepoCache,
}

impl GithubHandler {
    pub fn new(source: Arc<dyn RepositorySource>, cache_ttl: Duration) -> Self {
        GithubHandler {
            source,
            cache: RepoCache::new(cache_ttl),
        }
    }

    /// Cached listing while fresh, otherwise upstream, otherwise whatever
    /// stale copy we still hold.
    pub async fn repositories(&self) -> Result<RepoListing, AppError> {
        if let Some(repos) = self.cache.fresh() {
            return Ok(RepoListing { repos, source: ListingSource::Cache });
        }

        match self.fetch_and_store().await {
            Ok(repos) => Ok(RepoListing { repos, source: ListingSource::Upstream }),
            Err(e) => match self.cache.stale() {
                Some(repos) => {
                    tracing::warn!("GitHub fetch failed, serving stale cache: {}", e);
                    Ok(RepoListing { repos, source: ListingSource::Stale })
                }
                None => Err(AppError::GithubUnavailable(e.to_string())),
            },
        }
    }

    /// Forces an upstream fetch.
    pub async fn refresh(&self) -> Result<RepoListing, AppError> {
        let repos = self
            .fetch_and_store()
            .await
            .map_err(|e| AppError::GithubUnavailable(e.to_string()))?;
        Ok(RepoListing { repos, source: ListingSource::Upstream })
    }

    /// Fetches under a fresh ticket and returns the newest stored snapshot,
    /// which is this fetch's result unless a later one already landed.
    pub async fn fetch_and_store(&self) -> Result<Arc<Vec<RepoSummary>>, GithubError> {
        let ticket = self.cache.issue_ticket();
        let repos = showcase_repositories(self.source.fetch_repositories().await?);
        let count = repos.len();

        if self.cache.store(ticket, repos) {
            tracing::info!(ticket, count, "GitHub repositories cached");
        } else {
            tracing::debug!(ticket, "Dropped GitHub response older than the cached one");
        }
        Ok(self.cache.stale().unwrap_or_default())
    }

    /// Grid state for the server-rendered project cards.
    pub async fn grid(&self) -> GridState {
        match self.repositories().await {
            Ok(listing) => GridState::from_repos(listing.repos.to_vec()),
            Err(e) => {
                tracing::warn!("Project grid unavailable: {}", e);
                GridState::Failed
            }
        }
    }

    pub fn cache_age(&self) -> Option<Duration> {
        self.cache.age()
    }
}
