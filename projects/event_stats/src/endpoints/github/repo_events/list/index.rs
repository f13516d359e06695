use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::app::AppContext;
use crate::db::event::{models::Event, queries::get_all_events};

pub const LIST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    GetAllEvents {
        #[from]
        source: crate::db::event::queries::GetAllEventsError,
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
            HandlerError::GetAllEvents { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::BlockingTask { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EventView {
    pub repo: String,
    pub event_type: String,
    pub event_time: String,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            repo: event.repo,
            event_type: event.event_type,
            event_time: event.event_time.format(LIST_TIME_FORMAT).to_string(),
        }
    }
}

/// Axum handler: GET /list_events
pub async fn handler(Extension(ctx): Extension<AppContext>) -> Result<Json<Vec<EventView>>, HandlerError> {
    let pool = ctx.pool;
    let events = tokio::task::spawn_blocking(move || -> Result<Vec<Event>, HandlerError> {
        let mut conn = pool.get()?;
        Ok(get_all_events(&mut conn)?)
    })
    .await??;
    Ok(Json(events.into_iter().map(EventView::from).collect()))
}
