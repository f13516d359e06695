use axum::serve;
use interfaces_github_events::index::{BuildGitHubClientError, GitHubClient};
use projects_event_stats::{
	app::{router, AppContext},
	config::{AppConfig, ConfigError},
	db::{build_pool, run_migrations, BuildPoolError, RunMigrationsError},
};
use thiserror::Error;
use tracing::{debug, info};
use utils_trace::tracing_init;

#[derive(Debug, Error)]
pub enum MainError {
	#[error("TracingInit: {source}")]
	TracingInit {
		#[source]
		source: utils_trace::TracingInitError,
	},
	#[error("LoadConfig: {source}")]
	LoadConfig {
		#[source]
		source: ConfigError,
	},
	#[error("BuildPool: {source}")]
	BuildPool {
		#[source]
		source: BuildPoolError,
	},
	#[error("GetConnectionFromPool: {source}")]
	GetConnectionFromPool {
		#[source]
		source: r2d2::Error,
	},
	#[error("RunMigrations: {source}")]
	RunMigrations {
		#[source]
		source: RunMigrationsError,
	},
	#[error("BuildGitHubClient: {source}")]
	BuildGitHubClient {
		#[source]
		source: BuildGitHubClientError,
	},
	#[error("TcpListenerBind: {source}")]
	TcpListenerBind {
		#[source]
		source: std::io::Error,
	},
	#[error("Serve: {source}")]
	Serve {
		#[source]
		source: std::io::Error,
	}
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
	let dotenv_path = dotenvy::dotenv().ok();

	tracing_init("info")
		.map_err(|source| MainError::TracingInit { source })?;

	if let Some(path) = dotenv_path {
		debug!("Loaded environment from {}", path.display());
	}

	let config = AppConfig::from_env()
		.map_err(|source| MainError::LoadConfig { source })?;

	let pool = build_pool(&config.database_url)
		.map_err(|source| MainError::BuildPool { source })?;

	{
		let mut conn = pool
			.get()
			.map_err(|source| MainError::GetConnectionFromPool { source })?;
		let applied = run_migrations(&mut conn)
			.map_err(|source| MainError::RunMigrations { source })?;
		info!("Database ready at {} ({applied} migrations applied)", config.database_url);
	}

	let github = GitHubClient::new(&config.github_api_url, &config.github_token, config.github_timeout)
		.map_err(|source| MainError::BuildGitHubClient { source })?;

	let addr = config.bind_addr;
	info!("Monitoring {} repositories: {:?}", config.repositories.len(), config.repositories);

	let app = router(AppContext::new(pool, github, config));

	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.map_err(|source| MainError::TcpListenerBind { source })?;

	info!("Server running on addr: {}", addr);

	serve(listener, app)
		.await
		.map_err(|source| MainError::Serve { source })?;

	Ok(())
}
