//! Grammar parser and serializer for the filter query string.
//!
//! ```text
//! query := entry ("&" entry)*
//! entry := key "=" value
//! value := scalar | scalar "|" alt ("|" alt)*
//! alt   := percent-encoded key "=" value
//! ```

use super::codec::{decode, decode_component, encode, encode_component};
use super::model::{Node, Query, Rule, RuleGroup};

const ENTRY_SEPARATOR: char = '&';
const PAIR_SEPARATOR: char = '=';
const ALTERNATIVE_SEPARATOR: char = '|';

/// Parse a query string into a rule tree.
///
/// Total over arbitrary input: anything that is not grammar punctuation
/// ends up as literal path or value text.
pub fn parse(search: &str) -> Query {
    search
        .split(ENTRY_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Node {
    let (key, value) = split_pair(entry);

    let Some((first, alternatives)) = value.split_once(ALTERNATIVE_SEPARATOR) else {
        return Node::Rule(decode(key, value));
    };

    let mut rules = vec![decode(key, first)];
    rules.extend(alternatives.split(ALTERNATIVE_SEPARATOR).map(|segment| {
        let segment = decode_component(segment);
        let (alt_key, alt_value) = split_pair(&segment);
        decode(alt_key, alt_value)
    }));

    Node::Group(RuleGroup::new(rules))
}

fn split_pair(entry: &str) -> (&str, &str) {
    entry.split_once(PAIR_SEPARATOR).unwrap_or((entry, ""))
}

/// Serialize a rule tree back into its canonical query string.
///
/// Empty rules are dropped. Alternatives after the first one in a group
/// are percent-encoded once more so their own `=` cannot be confused with
/// the entry's.
pub fn stringify(query: &Query) -> String {
    let entries: Vec<String> = query
        .nodes()
        .iter()
        .map(stringify_node)
        .filter(|entry| !entry.is_empty())
        .collect();
    entries.join(&ENTRY_SEPARATOR.to_string())
}

fn stringify_node(node: &Node) -> String {
    match node {
        Node::Rule(rule) => encode(rule),
        Node::Group(group) => stringify_group(&group.rules),
    }
}

fn stringify_group(rules: &[Rule]) -> String {
    let mut encoded = rules.iter().map(encode).filter(|e| !e.is_empty());

    let Some(mut entry) = encoded.next() else {
        return String::new();
    };
    for alternative in encoded {
        entry.push(ALTERNATIVE_SEPARATOR);
        entry.push_str(&encode_component(&alternative));
    }
    entry
}

/// Canonical re-encoding of a query string.
pub fn normalize(search: &str) -> String {
    stringify(&parse(search))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::model::Operator;

    #[test]
    fn test_parse_and_composition() {
        let query = parse("a=1&b=2");
        assert_eq!(
            query.nodes(),
            &[
                Node::Rule(Rule::new("a", "1")),
                Node::Rule(Rule::new("b", "2"))
            ]
        );
        assert_eq!(stringify(&query), "a=1&b=2");
    }

    #[test]
    fn test_parse_or_group() {
        let query = parse("status=approved|status%3Anot%3Ddeclined");
        assert_eq!(query.len(), 1);

        let group = query.get(0).and_then(Node::as_group).unwrap();
        assert_eq!(
            group.rules,
            vec![
                Rule::new("status", "approved"),
                Rule::new("status", "declined").with_operator(Operator::Not),
            ]
        );
    }

    #[test]
    fn test_parse_or_group_with_different_keys() {
        let query = parse("total:greaterthan=10|currency%3DUSD|customer_id%3Ain%3D1%2C2");
        let group = query.get(0).and_then(Node::as_group).unwrap();

        assert_eq!(group.len(), 3);
        assert_eq!(group.rules[1], Rule::new("currency", "USD"));
        assert_eq!(
            group.rules[2],
            Rule::new("customer_id", "1,2").with_operator(Operator::In)
        );
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        let query = parse("&a=1&&b=2&");
        assert_eq!(query.len(), 2);
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_keeps_blank_values() {
        let query = parse("a=&b");
        assert_eq!(query.len(), 2);
        assert_eq!(query.get(0), Some(&Node::Rule(Rule::new("a", ""))));
        assert_eq!(query.get(1), Some(&Node::Rule(Rule::new("b", ""))));
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let query = parse("a=b=c");
        assert_eq!(query.get(0), Some(&Node::Rule(Rule::new("a", "b=c"))));
    }

    #[test]
    fn test_stringify_skips_empty_rules() {
        let query = Query::new(vec![
            Rule::new("a", "1").into(),
            Rule::empty().into(),
            RuleGroup::new(vec![Rule::empty(), Rule::empty()]).into(),
            Rule::new("b", "2").into(),
        ]);
        assert_eq!(stringify(&query), "a=1&b=2");
    }

    #[test]
    fn test_group_round_trip() {
        let query = Query::new(vec![
            RuleGroup::new(vec![
                Rule::new("status", "approved"),
                Rule::new("status", "100%|done").with_operator(Operator::Not),
                Rule::new("attributes", "x=y").with_name("color"),
            ])
            .into(),
            Rule::new("total", "5..10").into(),
        ]);

        let search = stringify(&query);
        assert_eq!(parse(&search), query);
    }

    #[test]
    fn test_group_alternative_name_with_escapes() {
        let query = Query::new(vec![RuleGroup::new(vec![
            Rule::new("attributes", "a").with_name("%41"),
            Rule::new("attributes", "b").with_name("50%25off"),
        ])
        .into()]);

        let parsed = parse(&stringify(&query));
        let group = parsed.get(0).and_then(Node::as_group).unwrap();
        assert_eq!(group.rules[0].name.as_deref(), Some("%41"));
        assert_eq!(group.rules[1].name.as_deref(), Some("50%25off"));
        assert_eq!(parsed, query);
    }

    #[test]
    fn test_normalize_is_stable() {
        let once = normalize("status=approved|status%3Anot%3Ddeclined&a=x%20y");
        assert_eq!(normalize(&once), once);
        assert_eq!(parse(&once), parse("status=approved|status%3Anot%3Ddeclined&a=x%20y"));
    }
}
