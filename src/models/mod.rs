pub mod analysis;
pub mod document;
pub mod enums;
pub mod event;

pub use analysis::{AnalysisRecord, DetectedEvent, Entity, StoredAnalysis, MUSICOLOGY_TERM_LABEL};
pub use document::Document;
pub use enums::DocumentStatus;
pub use event::Event;
