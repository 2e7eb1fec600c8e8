//! Zoom derivation: relations the API must eager-load for a filter.

use super::model::{Query, Rule};

const PATH_SEPARATOR: char = ':';
const ZOOM_SEPARATOR: &str = ",";

/// Relation names implied by every rule in the query, de-duplicated in
/// first-seen order and joined with `,`.
pub fn derive_zoom(query: &Query) -> String {
    let mut relations: Vec<&str> = Vec::new();

    for relation in query.rules().filter_map(relation_of) {
        if !relation.is_empty() && !relations.contains(&relation) {
            relations.push(relation);
        }
    }

    relations.join(ZOOM_SEPARATOR)
}

/// Relation a single rule needs, if any.
///
/// Attribute rules (any `name`, even empty) zoom on their full path; other
/// rules zoom on the parent of their last path segment.
pub fn relation_of(rule: &Rule) -> Option<&str> {
    if rule.name.is_some() {
        return Some(rule.path.as_str());
    }
    rule.path
        .rfind(PATH_SEPARATOR)
        .map(|last| &rule.path[..last])
}
