use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

use crate::db::event::models::Event;

/// Length of the trailing window the statistics are computed over.
pub fn stats_window() -> Duration {
    Duration::days(7)
}

/// Mean inter-arrival time in seconds, keyed by event type.
pub type InterArrivalAverages = BTreeMap<String, f64>;

/// Computes the mean gap between consecutive events of each type.
///
/// `events` must be ordered newest first, as returned by
/// [`get_recent_events`](crate::db::event::queries::get_recent_events).
/// Only events strictly newer than `now - 7 days` count. A type seen once
/// averages to `0.0`; a type with no events in the window is absent.
pub fn average_inter_arrival_seconds(events: &[Event], now: NaiveDateTime) -> InterArrivalAverages {
    let window_start = now - stats_window();

    let mut times_per_type: BTreeMap<&str, Vec<NaiveDateTime>> = BTreeMap::new();
    for event in events.iter().filter(|event| event.event_time > window_start) {
        times_per_type
            .entry(event.event_type.as_str())
            .or_default()
            .push(event.event_time);
    }

    times_per_type
        .into_iter()
        .map(|(event_type, times)| {
            let average = mean_gap_seconds(&times);
            debug!(event_type, samples = times.len(), average, "Computed inter-arrival average");
            (event_type.to_string(), average)
        })
        .collect()
}

/// Mean of `t[i-1] - t[i]` over a newest-first list.
fn mean_gap_seconds(times: &[NaiveDateTime]) -> f64 {
    if times.len() < 2 {
        return 0.0;
    }

    let total: f64 = times
        .windows(2)
        .map(|pair| seconds(pair[0] - pair[1]))
        .sum();

    total / (times.len() - 1) as f64
}

fn seconds(delta: Duration) -> f64 {
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Presentation form used by the HTTP layer, e.g. `"30.00 seconds"`.
pub fn format_seconds(average: f64) -> String {
    format!("{average:.2} seconds")
}
