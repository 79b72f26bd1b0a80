//! Prompt assembly for cross-decade synthesis.

use std::collections::BTreeMap;

/// Fallback phrase the model must use when a decade shows no evidenced
/// novelty. Exact text is contract; downstream consumers match on it.
pub const NO_NEW_DEVELOPMENT: &str = "No significant new development identified.";

/// Fallback phrase the model must use when a decade's data is too sparse.
/// Exact text is contract; downstream consumers match on it.
pub const INSUFFICIENT_EVIDENCE: &str = "Insufficient evidence for strong conclusion.";

pub const SYNTHESIS_SYSTEM_PROMPT: &str =
    "You are a senior academic researcher. Output ONLY valid JSON.";

/// Build the synthesis prompt. Decades are enumerated in label order with
/// their summaries verbatim; summaries are never re-summarized here.
pub fn build_synthesis_prompt(
    term: &str,
    start_year: i32,
    end_year: i32,
    decade_data: &BTreeMap<String, Vec<String>>,
) -> String {
    let mut decades_block = String::new();
    for (label, summaries) in decade_data {
        decades_block.push_str(&format!("\n### Decade: {label}\n"));
        for (i, summary) in summaries.iter().enumerate() {
            decades_block.push_str(&format!("Extract {}: {}\n", i + 1, summary));
        }
    }

    format!(
        r#"You are a rigorous academic research analyst.

You are analyzing academic documents discussing the concept "{term}".

The documents are grouped by decade from {start_year} to {end_year}.

Your task:

For EACH decade, analyze ONLY the provided material and produce:

1. what_spoken:
   - The dominant framing or definition of "{term}" in that decade.
   - How it was primarily interpreted or positioned.

2. what_discussed:
   - Major themes.
   - Recurring arguments.
   - Methodological approaches.
   - Debates or disagreements (if present).

3. new_discussion:
   - Clearly identifiable new interpretations.
   - Novel methodologies.
   - Conceptual shifts.
   - If no significant novelty is supported by evidence, write:
     "{NO_NEW_DEVELOPMENT}"

Rules:
- Use ONLY the provided documents.
- Do NOT invent information.
- Do NOT assume trends without evidence.
- If a decade has limited data, write:
  "{INSUFFICIENT_EVIDENCE}"
- Return strictly valid JSON.
- Do not include commentary outside JSON.

Return exactly in this format:

{{
  "concept": "{term}",
  "decades": [
    {{
      "decade": "...",
      "what_spoken": ["..."],
      "what_discussed": ["..."],
      "new_discussion": ["..."]
    }}
  ]
}}

Documents:
{decades_block}"#
    )
}
