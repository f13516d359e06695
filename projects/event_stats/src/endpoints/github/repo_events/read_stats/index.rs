use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDateTime, Utc};
use diesel::SqliteConnection;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::app::AppContext;
use crate::db::event::queries::{get_recent_events, GetRecentEventsError, RECENT_EVENTS_LIMIT};
use crate::utils::inter_arrival::{average_inter_arrival_seconds, format_seconds, stats_window};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    GetRecentEvents {
        #[from]
        source: GetRecentEventsError,
    },
    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::GetConnectionFromPool { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::GetRecentEvents { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::BlockingTask { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

/// repo -> event type -> `"<avg>.2f seconds"`
pub type FormattedStats = BTreeMap<String, BTreeMap<String, String>>;

/// Computes the formatted averages for every monitored repository as of `now`.
pub fn collect_repo_stats(
    conn: &mut SqliteConnection,
    repos: &[String],
    now: NaiveDateTime,
) -> Result<FormattedStats, GetRecentEventsError> {
    let since = now - stats_window();
    let mut stats = BTreeMap::new();

    for repo in repos {
        let events = get_recent_events(conn, repo, since, RECENT_EVENTS_LIMIT)?;
        let averages = average_inter_arrival_seconds(&events, now);
        debug!(repo = %repo, events = events.len(), types = averages.len(), "Stats computed");

        let formatted = averages
            .into_iter()
            .map(|(event_type, average)| (event_type, format_seconds(average)))
            .collect();
        stats.insert(repo.clone(), formatted);
    }

    Ok(stats)
}

/// Axum handler: GET /stats
pub async fn handler(Extension(ctx): Extension<AppContext>) -> Result<Json<FormattedStats>, HandlerError> {
    let now = Utc::now().naive_utc();
    let AppContext { pool, config, .. } = ctx;
    let stats = tokio::task::spawn_blocking(move || -> Result<FormattedStats, HandlerError> {
        let mut conn = pool.get()?;
        Ok(collect_repo_stats(&mut conn, &config.repositories, now)?)
    })
    .await??;
    Ok(Json(stats))
}
