use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = "github-event-stats";

/// One record from `GET /repos/{repo}/events`.
///
/// `created_at` is kept as the text the API sent; callers decide how strictly
/// to parse it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GitHubEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: String,
}

/// Outcome of probing `GET /repos/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoReachability {
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, BuildGitHubClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| BuildGitHubClientError::ClientBuild { source })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn repo_url(&self, repo: &str, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => format!("{}/repos/{repo}/{suffix}", self.base_url),
            None => format!("{}/repos/{repo}", self.base_url),
        }
    }

    /// Single GET, no retries. Any non-2xx status is an error.
    async fn get(&self, url: &str) -> Result<Response, FetchRepoError> {
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|source| FetchRepoError::RequestSend { source })?;

        response
            .error_for_status()
            .map_err(|source| FetchRepoError::ResponseStatus { source })
    }

    /// Commits are passed through untouched.
    pub async fn fetch_repo_commits(
        &self,
        repo: &str,
    ) -> Result<Vec<serde_json::Value>, FetchRepoError> {
        let url = self.repo_url(repo, Some("commits"));
        let commits: Vec<serde_json::Value> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|source| FetchRepoError::ResponseDecode { source })?;

        debug!(repo, count = commits.len(), "Fetched commits");
        Ok(commits)
    }

    pub async fn fetch_repo_events(&self, repo: &str) -> Result<Vec<GitHubEvent>, FetchRepoError> {
        let url = self.repo_url(repo, Some("events"));
        let events: Vec<GitHubEvent> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|source| FetchRepoError::ResponseDecode { source })?;

        debug!(repo, count = events.len(), "Fetched events");
        Ok(events)
    }

    /// Never fails: transport and status errors become `accessible: false`.
    pub async fn check_repo_reachable(&self, repo: &str) -> RepoReachability {
        let url = self.repo_url(repo, None);
        match self.get(&url).await {
            Ok(_) => RepoReachability {
                accessible: true,
                error: None,
            },
            Err(err) => RepoReachability {
                accessible: false,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildGitHubClientError {
    #[error("ClientBuild: {source}")]
    ClientBuild {
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchRepoError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseStatus: {source}")]
    ResponseStatus {
        source: reqwest::Error,
    },

    #[error("ResponseDecode: {source}")]
    ResponseDecode {
        source: reqwest::Error,
    },
}
