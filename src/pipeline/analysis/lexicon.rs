//! Regex safety net for fixed-vocabulary musicology terms.
//!
//! Model-extracted entities are unioned with a deterministic scan for a
//! closed vocabulary of technical terms, so a flaky model response never
//! loses the terms researchers actually search for.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::{Entity, MUSICOLOGY_TERM_LABEL};

/// Fixed vocabulary recognized regardless of model output.
pub const MUSICOLOGY_TERMS: &[&str] = &[
    "Mārga",
    "Rāga",
    "Tāla",
    "Gāndharva",
    "Sāman",
    "Nāṭyaśāstra",
    "Saṃgīta",
    "Prabandha",
    "Desi",
    "Vaadya",
];

static TERM_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    MUSICOLOGY_TERMS
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)\b{term}\b");
            (*term, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Append fixed-vocabulary terms found in the text but absent from the
/// entity set. Presence checks against existing entities are
/// case-insensitive. Scans the full document text, not the truncated
/// analysis slice.
pub fn apply_safety_net(entities: &mut Vec<Entity>, text: &str) {
    for (term, pattern) in TERM_PATTERNS.iter() {
        if !pattern.is_match(text) {
            continue;
        }

        let term_lower = term.to_lowercase();
        let already_present = entities.iter().any(|e| e.text.to_lowercase() == term_lower);
        if !already_present {
            debug!(term = %term, "Safety net matched musicology term");
            entities.push(Entity::new(term, MUSICOLOGY_TERM_LABEL));
        }
    }
}
