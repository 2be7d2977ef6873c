//! Prompt and citation handling.
//!
//! Retrieved context is rendered as numbered source blocks `[S1]..[Sn]`,
//! and the model is asked to cite sources with the same markers. Citation
//! markers in the final answer are resolved back to the chunks they came
//! from.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use wfi_core::CoreError;
use wfi_rag::SearchResult;

static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[S(\d+)\]").expect("valid citation regex"));

/// A resolved citation: which chunk supported which `[Sn]` marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// The marker as it appears in the answer, e.g. `S1`.
    pub marker: String,
    /// Id of the supporting chunk.
    pub chunk_id: String,
    /// Source label of the supporting chunk (file name or document id).
    pub source: String,
}

/// Render the retrieved context as numbered source blocks.
///
/// Returns an empty string when there is no context.
pub fn render_context(context: &[SearchResult]) -> String {
    let mut out = String::new();
    for (i, result) in context.iter().enumerate() {
        out.push_str(&format!(
            "[S{}] (source: {})\n{}\n\n",
            i + 1,
            result.chunk.source(),
            result.chunk.text.trim(),
        ));
    }
    out
}

/// Build the system prompt from the instruction and rendered context.
pub fn system_prompt(instruction: &str, context: &[SearchResult]) -> String {
    if context.is_empty() {
        return instruction.to_string();
    }
    format!(
        "{instruction}\n\n\
         Use the following retrieved passages when answering. Cite a passage\n\
         by writing its marker, e.g. [S1], directly after the claim it supports.\n\
         Only cite markers that appear below.\n\n{}",
        render_context(context)
    )
}

/// Resolve `[Sn]` markers in the answer text against the context.
///
/// Markers are deduplicated, keeping first-appearance order.
///
/// # Errors
///
/// Returns [`CoreError::Parse`] if the answer cites a marker with no
/// corresponding source block. Callers fall back to the raw text.
pub fn parse_citations(
    text: &str,
    context: &[SearchResult],
) -> wfi_core::Result<Vec<Citation>> {
    let mut citations: Vec<Citation> = Vec::new();

    for capture in CITATION_MARKER.captures_iter(text) {
        let index: usize = capture[1]
            .parse()
            .map_err(|_| CoreError::Parse(format!("unreadable citation marker {}", &capture[0])))?;

        if index == 0 || index > context.len() {
            return Err(CoreError::Parse(format!(
                "answer cites [S{index}] but only {} sources were provided",
                context.len()
            )));
        }

        let marker = format!("S{index}");
        if citations.iter().any(|c| c.marker == marker) {
            continue;
        }
        let chunk = &context[index - 1].chunk;
        citations.push(Citation {
            marker,
            chunk_id: chunk.id.clone(),
            source: chunk.source().to_string(),
        });
    }

    Ok(citations)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wfi_rag::Chunk;

    use super::*;

    fn context(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| SearchResult {
                chunk: Chunk {
                    id: format!("doc_{i}"),
                    document_id: "doc".into(),
                    text: format!("passage {i}"),
                    start: 0,
                    end: 0,
                    embedding: Vec::new(),
                    metadata: HashMap::from([(
                        "source".to_string(),
                        format!("policy_{i}.txt"),
                    )]),
                },
                score: 1.0 - i as f32 * 0.1,
            })
            .collect()
    }

    #[test]
    fn markers_resolve_in_first_appearance_order() {
        let citations =
            parse_citations("Covered [S2], also [S1], again [S2].", &context(3)).unwrap();
        let markers: Vec<&str> = citations.iter().map(|c| c.marker.as_str()).collect();
        assert_eq!(markers, vec!["S2", "S1"]);
        assert_eq!(citations[0].chunk_id, "doc_1");
        assert_eq!(citations[0].source, "policy_1.txt");
    }

    #[test]
    fn out_of_range_marker_is_a_parse_error() {
        let err = parse_citations("See [S5].", &context(2));
        assert!(matches!(err, Err(CoreError::Parse(_))));
    }

    #[test]
    fn text_without_markers_has_no_citations() {
        assert!(parse_citations("No citations here.", &context(2)).unwrap().is_empty());
    }

    #[test]
    fn system_prompt_embeds_numbered_sources() {
        let prompt = system_prompt("You are an HR assistant.", &context(2));
        assert!(prompt.contains("[S1] (source: policy_0.txt)"));
        assert!(prompt.contains("[S2] (source: policy_1.txt)"));
        assert!(prompt.contains("passage 1"));
    }
}
