use axum::{
	extract::{Extension, Json},
	http::StatusCode,
	response::IntoResponse,
};
use chrono::NaiveDateTime;
use interfaces_github_events::index::{FetchRepoError, GitHubClient, GitHubEvent};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::app::AppContext;
use crate::db::{
	event::{models::NewEvent, queries::{insert_events, InsertEventsError}},
	SqlitePool,
};

/// Layout of `created_at` in remote event records (always UTC).
pub const GITHUB_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Error)]
pub enum IngestRepoEventsError {
	#[error("FetchRepoEvents: {source}")]
	FetchRepoEvents {
		#[from]
		source: FetchRepoError,
	},

	#[error("MalformedTimestamp: {event_type} at {created_at:?}: {source}")]
	MalformedTimestamp {
		event_type: String,
		created_at: String,
		source: chrono::ParseError,
	},

	#[error("GetConnectionFromPool: {source}")]
	GetConnectionFromPool {
		#[from]
		source: r2d2::Error,
	},

	#[error(transparent)]
	InsertEvents {
		#[from]
		source: InsertEventsError,
	},

	#[error("BlockingTask: {source}")]
	BlockingTask {
		#[from]
		source: tokio::task::JoinError,
	},
}

#[derive(Debug, Error)]
pub enum HandlerError {
	#[error("IngestRepoEvents: {repo}: {source}")]
	IngestRepoEvents {
		repo: String,
		source: IngestRepoEventsError,
	},
}

impl IntoResponse for HandlerError {
	fn into_response(self) -> axum::response::Response {
		error!("{self}");
		let status = match &self {
			HandlerError::IngestRepoEvents { source, .. } => match source {
				IngestRepoEventsError::FetchRepoEvents { .. }
				| IngestRepoEventsError::MalformedTimestamp { .. } => StatusCode::BAD_GATEWAY,
				IngestRepoEventsError::GetConnectionFromPool { .. }
				| IngestRepoEventsError::InsertEvents { .. }
				| IngestRepoEventsError::BlockingTask { .. } => StatusCode::INTERNAL_SERVER_ERROR,
			},
		};
		(status, self.to_string()).into_response()
	}
}

pub fn parse_event_time(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
	NaiveDateTime::parse_from_str(raw, GITHUB_TIMESTAMP_FORMAT)
}

/// Validates every timestamp before anything is written, so a bad record
/// leaves the repository's batch untouched.
pub fn to_new_events<'a>(
	repo: &'a str,
	raw_events: &'a [GitHubEvent],
) -> Result<Vec<NewEvent<'a>>, IngestRepoEventsError> {
	raw_events
		.iter()
		.map(|raw| {
			let event_time = parse_event_time(&raw.created_at).map_err(|source| {
				IngestRepoEventsError::MalformedTimestamp {
					event_type: raw.event_type.clone(),
					created_at: raw.created_at.clone(),
					source,
				}
			})?;
			Ok(NewEvent {
				repo,
				event_type: &raw.event_type,
				event_time,
			})
		})
		.collect()
}

/// Validates and stores one repository's fetched events as a single transaction.
pub fn store_repo_events(
	pool: &SqlitePool,
	repo: &str,
	raw_events: &[GitHubEvent],
) -> Result<usize, IngestRepoEventsError> {
	let batch = to_new_events(repo, raw_events)?;

	let mut conn = pool.get()?;
	let inserted = insert_events(&mut conn, &batch)?;
	debug!(repo, inserted, "Saved events");

	Ok(inserted)
}

/// Fetches one page of events for `repo` and stores it on the blocking pool.
pub async fn ingest_repo_events(
	github: &GitHubClient,
	pool: &SqlitePool,
	repo: &str,
) -> Result<usize, IngestRepoEventsError> {
	let raw_events = github.fetch_repo_events(repo).await?;

	let pool = pool.clone();
	let repo = repo.to_string();
	tokio::task::spawn_blocking(move || store_repo_events(&pool, &repo, &raw_events)).await?
}

/// Stops at the first repository that fails. Batches already committed for
/// earlier repositories stay.
pub async fn ingest_all_repo_events(
	github: &GitHubClient,
	pool: &SqlitePool,
	repos: &[String],
) -> Result<usize, HandlerError> {
	let mut total = 0;
	for repo in repos {
		total += ingest_repo_events(github, pool, repo)
			.await
			.map_err(|source| HandlerError::IngestRepoEvents { repo: repo.clone(), source })?;
	}
	Ok(total)
}

/// Axum handler: POST /update
pub async fn handler(Extension(ctx): Extension<AppContext>) -> Result<impl IntoResponse, HandlerError> {
	let total = ingest_all_repo_events(&ctx.github, &ctx.pool, ctx.repositories()).await?;
	info!(total, repos = ctx.repositories().len(), "Events updated");

	Ok((StatusCode::CREATED, Json(json!({ "message": "Events updated" }))))
}
