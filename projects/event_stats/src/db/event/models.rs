use chrono::NaiveDateTime;
use diesel::prelude::*;
use crate::db::schema::events;

/// A stored activity record. `event_time` is UTC.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Event {
    pub id: i32,
    pub repo: String,
    pub event_type: String,
    pub event_time: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent<'a> {
    pub repo: &'a str,
    pub event_type: &'a str,
    pub event_time: NaiveDateTime,
}
