use std::sync::Arc;

use axum::{
	routing::{get, post},
	Extension, Router,
};
use interfaces_github_events::index::GitHubClient;

use crate::config::AppConfig;
use crate::db::SqlitePool;
use crate::endpoints::github::{
	commits::read::index::handler as github_commits_read_handler,
	repo_events::list::index::handler as github_repo_events_list_handler,
	repo_events::read_stats::index::handler as github_repo_events_read_stats_handler,
	repo_events::update::index::handler as github_repo_events_update_handler,
	repos::check::index::handler as github_repos_check_handler,
};

/// Everything a request handler may touch. Built once in `main`.
#[derive(Clone)]
pub struct AppContext {
	pub pool: SqlitePool,
	pub github: GitHubClient,
	pub config: Arc<AppConfig>,
}

impl AppContext {
	pub fn new(pool: SqlitePool, github: GitHubClient, config: AppConfig) -> Self {
		Self {
			pool,
			github,
			config: Arc::new(config),
		}
	}

	pub fn repositories(&self) -> &[String] {
		&self.config.repositories
	}
}

pub fn router(ctx: AppContext) -> Router {
	Router::new()
		.route("/commits", get(github_commits_read_handler))
		.route("/update", post(github_repo_events_update_handler))
		.route("/stats", get(github_repo_events_read_stats_handler))
		.route("/check_repos", get(github_repos_check_handler))
		.route("/list_events", get(github_repo_events_list_handler))
		.layer(Extension(ctx))
}
