//! Repository activity statistics service
//!
//! - REST API endpoints in `endpoints/`
//! - SQLite models, queries and migrations in `db/`
//! - Rolling inter-arrival statistics in `utils/`
//! - Requires GITHUB_TOKEN and MONITORED_REPOSITORIES (see `config`)

pub mod app;
pub mod config;
pub mod db;
pub mod endpoints;
pub mod utils;
