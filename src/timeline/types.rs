use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Entity;

/// An event admitted to the timeline: its date parsed and ready to bucket.
/// Serialized dates are ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub date_str: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub entities: Vec<Entity>,
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

/// One shared-entity link between two events. A pair of events sharing N
/// entities carries N edges, one per entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStatistics {
    pub total_events: usize,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// Distinct event types present, sorted.
    pub event_types: Vec<String>,
}

/// Everything one timeline build produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    /// Retained events in ascending date order.
    pub events: Vec<TimelineEvent>,
    /// Decade bucket (e.g. 1930) to the events dated within it.
    pub decades: BTreeMap<i32, Vec<TimelineEvent>>,
    pub graph: TimelineGraph,
    pub statistics: TimelineStatistics,
}

/// Persisted timeline artifact row. The core builds the value; writing the
/// JSON file at `file_path` is the collaborator's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub data: TimelineData,
    pub file_path: String,
}

impl TimelineRecord {
    /// `source_event_count` is the size of the input set the build saw,
    /// dropped events included.
    pub fn new(name: &str, source_event_count: usize, data: TimelineData, file_path: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("Generated from {source_event_count} events"),
            created_at: Utc::now(),
            data,
            file_path: file_path.to_string(),
        }
    }
}

/// Default artifact location for a named timeline.
pub fn artifact_path(name: &str) -> PathBuf {
    crate::config::timelines_dir().join(format!("{}.json", name.replace(' ', "_")))
}
