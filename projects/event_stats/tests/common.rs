#![allow(dead_code)]
use std::net::SocketAddr;
use std::time::Duration;

use interfaces_github_events::index::GitHubClient;
use projects_event_stats::{
    app::{router, AppContext},
    config::AppConfig,
    db::{build_pool, run_migrations},
};
use tempfile::TempDir;
use wiremock::MockServer;

/// A running service wired to a mock remote API and a throwaway database.
pub struct TestService {
    pub base_url: String,
    pub remote: MockServer,
    pub http: reqwest::Client,
    _db_dir: TempDir,
}

pub async fn spawn_service(repositories: &[&str]) -> anyhow::Result<TestService> {
    spawn_service_with_timeout(repositories, Duration::from_secs(5)).await
}

pub async fn spawn_service_with_timeout(
    repositories: &[&str],
    github_timeout: Duration,
) -> anyhow::Result<TestService> {
    let remote = MockServer::start().await;
    let db_dir = tempfile::tempdir()?;
    let database_url = db_dir.path().join("events.db").to_string_lossy().to_string();

    let config = AppConfig {
        github_api_url: remote.uri(),
        github_token: "test-token".to_string(),
        repositories: repositories.iter().map(|r| r.to_string()).collect(),
        database_url: database_url.clone(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        github_timeout,
    };

    let pool = build_pool(&database_url)?;
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    drop(conn);
    let github = GitHubClient::new(&config.github_api_url, &config.github_token, config.github_timeout)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;
    let app = router(AppContext::new(pool, github, config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(TestService {
        base_url: format!("http://{addr}"),
        remote,
        http: reqwest::Client::new(),
        _db_dir: db_dir,
    })
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
