//! Read-only client for the repository-hosting REST API.

pub mod index;
