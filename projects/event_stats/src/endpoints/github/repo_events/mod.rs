pub mod list;
pub mod read_stats;
pub mod update;
