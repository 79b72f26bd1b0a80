//! Timeline construction over persisted events.
//!
//! Takes a point-in-time snapshot of the event store and produces one
//! self-contained structure: events sorted chronologically, bucketed by
//! decade, linked through an entity co-occurrence graph, and summarized.
//! Events without a parseable date are excluded, not errors.

mod builder;
mod graph;
mod types;

pub use builder::*;
pub use graph::*;
pub use types::*;

// ── Tests ──────────────────────────────────────────────────────────────────
