//! Context assembly, citation deduplication and flow labelling.
//!
//! Evidence is ordered structured-first, then document, keeping arrival
//! order inside each path. The rendered texts are concatenated up to a
//! character budget: items that do not fit are dropped whole from the
//! tail, except that an oversize first item is cut on a char boundary so
//! the context is never empty when evidence exists. Citations cover only
//! the items that made it into the context.

use std::collections::HashSet;

use crate::models::{Citation, EvidenceItem, RetrievalPath};

/// Tag appended to every flow label for the generation step.
pub const GENERATION_TAG: &str = "generation";

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub text: String,
    pub citations: Vec<Citation>,
    pub flow_label: String,
    /// Items dropped or cut to respect the budget.
    pub truncated: bool,
}

/// Builds `"structured + document + generation"` from the paths that
/// produced evidence, deduplicated and in path order.
pub fn flow_label(paths: &[RetrievalPath]) -> String {
    let mut fired: Vec<RetrievalPath> = Vec::new();
    for p in [RetrievalPath::Structured, RetrievalPath::Document] {
        if paths.contains(&p) {
            fired.push(p);
        }
    }

    let mut parts: Vec<&str> = fired.iter().map(|p| p.tag()).collect();
    parts.push(GENERATION_TAG);
    parts.join(" + ")
}

/// Deduplicates by `(source, chunk_id)`, keeping first-seen order.
pub fn dedup_citations<'a, I>(items: I) -> Vec<Citation>
where
    I: IntoIterator<Item = &'a EvidenceItem>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let citation = item.citation();
        if seen.insert(citation.clone()) {
            out.push(citation);
        }
    }
    out
}

pub fn assemble(evidence: Vec<EvidenceItem>, max_chars: usize) -> AssembledContext {
    let (mut ordered, document): (Vec<_>, Vec<_>) = evidence
        .into_iter()
        .partition(|e| e.path == RetrievalPath::Structured);
    ordered.extend(document);

    let paths: Vec<RetrievalPath> = ordered.iter().map(|e| e.path).collect();
    let label = flow_label(&paths);

    let mut text = String::new();
    let mut used_chars = 0usize;
    let mut included: Vec<&EvidenceItem> = Vec::new();
    let mut truncated = false;

    for item in &ordered {
        let len = item.text.chars().count();
        if used_chars + len <= max_chars {
            text.push_str(&item.text);
            used_chars += len;
            included.push(item);
        } else if included.is_empty() {
            text.extend(item.text.chars().take(max_chars));
            included.push(item);
            truncated = true;
            break;
        } else {
            truncated = true;
            break;
        }
    }

    AssembledContext {
        text,
        citations: dedup_citations(included),
        flow_label: label,
        truncated,
    }
}
