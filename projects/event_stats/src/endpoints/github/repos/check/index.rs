use axum::extract::{Extension, Json};
use interfaces_github_events::index::{GitHubClient, RepoReachability};
use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::app::AppContext;

pub type ReachabilityPerRepo = BTreeMap<String, RepoReachability>;

/// Probes every repository; one failure never stops the others.
pub async fn check_repos(github: &GitHubClient, repos: &[String]) -> ReachabilityPerRepo {
	let mut results = BTreeMap::new();

	for repo in repos {
		debug!(repo = %repo, "Checking repository");
		let reachability = github.check_repo_reachable(repo).await;
		match &reachability.error {
			Some(err) => error!(repo = %repo, "Error accessing repository: {err}"),
			None => debug!(repo = %repo, "Repository is accessible"),
		}
		results.insert(repo.clone(), reachability);
	}

	results
}

/// Axum handler: GET /check_repos
pub async fn handler(Extension(ctx): Extension<AppContext>) -> Json<ReachabilityPerRepo> {
	Json(check_repos(&ctx.github, ctx.repositories()).await)
}
