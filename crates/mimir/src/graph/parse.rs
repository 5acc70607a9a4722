//! Parsers for extraction model output

use crate::graph::KnowledgeTriple;

/// Separator between triples in extraction output
pub const KG_TRIPLE_DELIMITER: &str = "<|>";

const NONE: &str = "NONE";

/// Parse a comma separated entity list. `NONE` means no entities.
pub fn parse_entities(output: &str) -> Vec<String> {
    let output = output.trim();
    if output == NONE {
        return Vec::new();
    }

    output
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `(subject, predicate, object)<|>(...)` output.
///
/// Parts that do not have exactly three comma separated fields are skipped.
pub fn parse_triples(output: &str) -> Vec<KnowledgeTriple> {
    let output = output.trim();
    if output == NONE {
        return Vec::new();
    }

    output
        .split(KG_TRIPLE_DELIMITER)
        .filter_map(parse_triple)
        .collect()
}

fn parse_triple(raw: &str) -> Option<KnowledgeTriple> {
    let raw = raw.trim();
    let inner = raw.strip_prefix('(').unwrap_or(raw);
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    let parts: Vec<&str> = inner.split(", ").collect();
    let [subject, predicate, object] = parts.as_slice() else {
        return None;
    };

    let (subject, predicate, object) = (subject.trim(), predicate.trim(), object.trim());
    if subject.is_empty() || predicate.is_empty() || object.is_empty() {
        return None;
    }
    Some(KnowledgeTriple::new(subject, predicate, object))
}
