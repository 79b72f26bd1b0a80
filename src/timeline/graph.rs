use std::collections::BTreeMap;

use super::types::{GraphEdge, GraphNode, TimelineEvent, TimelineGraph};

/// Build the entity co-occurrence graph over retained timeline events.
///
/// Every event becomes a node. For each entity text, the ids of the events
/// mentioning it are collected first-occurrence-deduplicated, then every
/// unordered pair gets one edge labeled with that entity. Two events
/// sharing N entities are therefore linked by N edges.
pub fn build_graph(events: &[TimelineEvent]) -> TimelineGraph {
    let mut nodes = Vec::with_capacity(events.len());
    let mut entity_to_nodes: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for event in events {
        let node_id = format!("event_{}", event.id);
        nodes.push(GraphNode {
            id: node_id.clone(),
            label: event.title.clone(),
            node_type: "event".to_string(),
        });

        for entity in &event.entities {
            if entity.text.is_empty() {
                continue;
            }
            let ids = entity_to_nodes.entry(entity.text.clone()).or_default();
            // An event snapshot can repeat an entity text under different
            // labels; one membership per event keeps self-edges out.
            if !ids.contains(&node_id) {
                ids.push(node_id.clone());
            }
        }
    }

    let mut edges = Vec::new();
    for (text, ids) in &entity_to_nodes {
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                edges.push(GraphEdge {
                    source: ids[i].clone(),
                    target: ids[j].clone(),
                    label: format!("Shared entity: {text}"),
                });
            }
        }
    }

    TimelineGraph { nodes, edges }
}
