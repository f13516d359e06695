use chrono::NaiveDateTime;
use diesel::prelude::*;
use thiserror::Error;
use crate::db::{event::models::*, schema::events::dsl::*};

/// Upper bound on rows handed to the stats engine per repository.
pub const RECENT_EVENTS_LIMIT: i64 = 500;

#[derive(Debug, Error)]
pub enum InsertEventsError {
    #[error("InsertEvents: {source}")]
    InsertEvents {
        #[from]
        source: diesel::result::Error,
    },
}

/// Appends the whole batch in one transaction. Duplicates are accepted.
pub fn insert_events(
    conn: &mut SqliteConnection,
    batch: &[NewEvent],
) -> Result<usize, InsertEventsError> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let mut inserted = 0;
        for new in batch {
            inserted += diesel::insert_into(events).values(new).execute(conn)?;
        }
        Ok(inserted)
    })
    .map_err(|source| InsertEventsError::InsertEvents { source })
}

#[derive(Debug, Error)]
pub enum GetRecentEventsError {
    #[error("GetRecentEvents: {source}")]
    GetRecentEvents {
        #[from]
        source: diesel::result::Error,
    },
}

/// Events of `repo_val` strictly newer than `since`, newest first.
pub fn get_recent_events(
    conn: &mut SqliteConnection,
    repo_val: &str,
    since: NaiveDateTime,
    limit: i64,
) -> Result<Vec<Event>, GetRecentEventsError> {
    events
        .filter(repo.eq(repo_val))
        .filter(event_time.gt(since))
        .order((event_time.desc(), id.desc()))
        .limit(limit)
        .select(Event::as_select())
        .load(conn)
        .map_err(|source| GetRecentEventsError::GetRecentEvents { source })
}

#[derive(Debug, Error)]
pub enum GetAllEventsError {
    #[error("GetAllEvents: {source}")]
    GetAllEvents {
        #[from]
        source: diesel::result::Error,
    },
}

/// Every stored event in insertion order.
pub fn get_all_events(conn: &mut SqliteConnection) -> Result<Vec<Event>, GetAllEventsError> {
    events
        .order(id.asc())
        .select(Event::as_select())
        .load(conn)
        .map_err(|source| GetAllEventsError::GetAllEvents { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{build_pool, run_migrations, SqlitePool};
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn pool() -> (TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");
        let pool = build_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&mut pool.get().unwrap()).unwrap();
        (dir, pool)
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn new_event<'a>(repo_val: &'a str, kind: &'a str, time: NaiveDateTime) -> NewEvent<'a> {
        NewEvent {
            repo: repo_val,
            event_type: kind,
            event_time: time,
        }
    }

    #[test]
    fn duplicates_are_stored_twice() {
        let (_dir, pool) = pool();
        let mut conn = pool.get().unwrap();
        let e = new_event("a/b", "PushEvent", at(10, 0, 0));

        assert_eq!(insert_events(&mut conn, &[e.clone(), e]).unwrap(), 2);

        let all = get_all_events(&mut conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].event_time, all[1].event_time);
        assert!(all[0].id < all[1].id);
    }

    #[test]
    fn recent_events_are_newest_first_and_windowed() {
        let (_dir, pool) = pool();
        let mut conn = pool.get().unwrap();
        insert_events(
            &mut conn,
            &[
                new_event("a/b", "PushEvent", at(10, 0, 0)),
                new_event("a/b", "ForkEvent", at(12, 0, 0)),
                new_event("a/b", "PushEvent", at(11, 0, 0)),
                new_event("c/d", "PushEvent", at(11, 30, 0)),
                new_event("a/b", "PushEvent", at(9, 0, 0)),
            ],
        )
        .unwrap();

        let recent = get_recent_events(&mut conn, "a/b", at(9, 0, 0), RECENT_EVENTS_LIMIT).unwrap();

        let times: Vec<_> = recent.iter().map(|e| e.event_time).collect();
        assert_eq!(times, vec![at(12, 0, 0), at(11, 0, 0), at(10, 0, 0)]);
        assert!(recent.iter().all(|e| e.repo == "a/b"));
    }

    #[test]
    fn recent_events_respect_limit() {
        let (_dir, pool) = pool();
        let mut conn = pool.get().unwrap();
        let start = at(0, 0, 0);
        let times: Vec<_> = (0..520).map(|i| start + Duration::seconds(i)).collect();
        let batch: Vec<_> = times
            .iter()
            .map(|t| new_event("a/b", "PushEvent", *t))
            .collect();
        insert_events(&mut conn, &batch).unwrap();

        let recent = get_recent_events(
            &mut conn,
            "a/b",
            start - Duration::days(1),
            RECENT_EVENTS_LIMIT,
        )
        .unwrap();

        assert_eq!(recent.len(), 500);
        assert_eq!(recent[0].event_time, start + Duration::seconds(519));
        assert!(recent
            .windows(2)
            .all(|pair| pair[0].event_time >= pair[1].event_time));
    }
}
