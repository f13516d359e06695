pub mod commits;
pub mod repo_events;
pub mod repos;
