use axum::{
	extract::{Extension, Json},
	http::StatusCode,
	response::IntoResponse,
};
use interfaces_github_events::index::{FetchRepoError, GitHubClient};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error};

use crate::app::AppContext;

#[derive(Debug, Error)]
pub enum HandlerError {
	#[error("FetchRepoCommits: {repo}: {source}")]
	FetchRepoCommits {
		repo: String,
		source: FetchRepoError,
	},
}

impl IntoResponse for HandlerError {
	fn into_response(self) -> axum::response::Response {
		error!("{self}");
		match self {
			HandlerError::FetchRepoCommits { .. } => (StatusCode::BAD_GATEWAY, self.to_string()).into_response(),
		}
	}
}

pub type CommitsPerRepo = BTreeMap<String, Vec<serde_json::Value>>;

/// Stops at the first repository that fails; nothing partial is returned.
pub async fn fetch_commits_per_repo(
	github: &GitHubClient,
	repos: &[String],
) -> Result<CommitsPerRepo, HandlerError> {
	let mut commits_per_repo = BTreeMap::new();

	for repo in repos {
		let commits = github
			.fetch_repo_commits(repo)
			.await
			.map_err(|source| HandlerError::FetchRepoCommits { repo: repo.clone(), source })?;
		debug!(repo = %repo, count = commits.len(), "Collected commits");
		commits_per_repo.insert(repo.clone(), commits);
	}

	Ok(commits_per_repo)
}

/// Axum handler: GET /commits
pub async fn handler(Extension(ctx): Extension<AppContext>) -> Result<Json<CommitsPerRepo>, HandlerError> {
	let commits = fetch_commits_per_repo(&ctx.github, ctx.repositories()).await?;
	Ok(Json(commits))
}
