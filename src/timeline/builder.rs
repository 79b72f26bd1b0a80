use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use super::graph::build_graph;
use super::types::{TimelineData, TimelineEvent, TimelineStatistics};
use crate::models::Event;
use crate::pipeline::dates::decade_of_year;

/// Build the timeline structure from a snapshot of persisted events.
///
/// Events whose `normalized_date` is missing or unparseable are excluded
/// and logged, never an error. Bucket membership follows the event's own
/// date, not the owning document's decade. Deterministic for a fixed
/// input.
pub fn build(events: &[Event]) -> TimelineData {
    info!(events = events.len(), "Building timeline");

    let mut retained: Vec<TimelineEvent> = Vec::new();
    for event in events {
        let Some(raw_date) = event.normalized_date.as_deref() else {
            debug!(event_id = %event.id, "Event has no normalized date, excluded from timeline");
            continue;
        };
        let Some(date) = parse_iso_date(raw_date) else {
            warn!(
                event_id = %event.id,
                date = raw_date,
                "Failed to parse event date, excluded from timeline"
            );
            continue;
        };
        retained.push(TimelineEvent {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            date,
            date_str: event.date_str.clone(),
            event_type: event.event_type.clone(),
            entities: event.entities.clone(),
            sentence: event.sentence.clone(),
        });
    }

    // Stable sort: same-date events keep their input order.
    retained.sort_by_key(|e| e.date);

    let mut decades: BTreeMap<i32, Vec<TimelineEvent>> = BTreeMap::new();
    for event in &retained {
        decades
            .entry(decade_of_year(event.date.year()))
            .or_default()
            .push(event.clone());
    }

    let graph = build_graph(&retained);

    let mut event_types: Vec<String> = retained.iter().map(|e| e.event_type.clone()).collect();
    event_types.sort();
    event_types.dedup();

    let statistics = TimelineStatistics {
        total_events: retained.len(),
        start_year: retained.first().map(|e| e.date.year()),
        end_year: retained.last().map(|e| e.date.year()),
        event_types,
    };

    info!(
        retained = retained.len(),
        dropped = events.len() - retained.len(),
        decades = decades.len(),
        edges = graph.edges.len(),
        "Timeline built"
    );

    TimelineData {
        events: retained,
        decades,
        graph,
        statistics,
    }
}

/// Parse an ISO-8601 date or date-time string.
fn parse_iso_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
