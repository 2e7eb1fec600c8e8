//! Rule tree types shared by the parser, codec, zoom deriver and editor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison modifier attached to a rule key as a `:operator` suffix.
///
/// A rule without an operator means implicit equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    LessThanOrEqual,
    LessThan,
    GreaterThanOrEqual,
    GreaterThan,
    IsDefined,
    Not,
    In,
}

impl Operator {
    /// All operators in suffix-matching order.
    ///
    /// Longer tokens come before their prefixes (`lessthanorequal` before
    /// `lessthan`) so suffix matching picks the longest one.
    pub const ALL: [Operator; 7] = [
        Operator::LessThanOrEqual,
        Operator::LessThan,
        Operator::GreaterThanOrEqual,
        Operator::GreaterThan,
        Operator::IsDefined,
        Operator::Not,
        Operator::In,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::LessThanOrEqual => "lessthanorequal",
            Operator::LessThan => "lessthan",
            Operator::GreaterThanOrEqual => "greaterthanorequal",
            Operator::GreaterThan => "greaterthan",
            Operator::IsDefined => "isdefined",
            Operator::Not => "not",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("Unknown operator: '{}'", s))
    }
}

/// A single filter condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Colon-delimited field path, e.g. `customer:default_billing_address:country`
    pub path: String,
    /// Attribute selector for attribute-style paths (`foo[bar]` gives `bar`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub value: String,
}

impl Rule {
    /// Create an implicit-equality rule
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Rule {
            path: path.into(),
            name: None,
            operator: None,
            value: value.into(),
        }
    }

    /// Blank draft rule used for the "add new" slot
    pub fn empty() -> Self {
        Rule::default()
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// True for a rule that contributes nothing to the serialized query.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
            && self.name.as_deref().map_or(true, str::is_empty)
            && self.operator.is_none()
            && self.value.is_empty()
    }

    /// Copy of this rule seeded as a fresh OR alternative: same selector,
    /// operator reset to implicit equality, value cleared.
    pub fn blank_alternative(&self) -> Self {
        Rule {
            path: self.path.clone(),
            name: self.name.clone(),
            operator: None,
            value: String::new(),
        }
    }
}

/// Rules OR'ed together at a single top-level position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleGroup {
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleGroup { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One top-level element of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Rule(Rule),
    Group(RuleGroup),
}

impl Node {
    /// Iterate over the rules this node contains, in order
    pub fn rules(&self) -> std::slice::Iter<'_, Rule> {
        match self {
            Node::Rule(rule) => std::slice::from_ref(rule).iter(),
            Node::Group(group) => group.rules.iter(),
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&RuleGroup> {
        match self {
            Node::Group(group) => Some(group),
            Node::Rule(_) => None,
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<RuleGroup> for Node {
    fn from(group: RuleGroup) -> Self {
        Node::Group(group)
    }
}

/// Ordered AND-composition of rules and OR-groups.
///
/// Queries are values: editing produces a new `Query` and never mutates
/// the one it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    nodes: Vec<Node>,
}

impl Query {
    pub fn new(nodes: Vec<Node>) -> Self {
        Query { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Every rule in traversal order, including group members
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.nodes.iter().flat_map(Node::rules)
    }
}

impl FromIterator<Node> for Query {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Query {
            nodes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_from_str_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("equals".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_serializes_lowercase() {
        let json = serde_json::to_string(&Operator::GreaterThanOrEqual).unwrap();
        assert_eq!(json, "\"greaterthanorequal\"");
    }

    #[test]
    fn test_empty_rule_detection() {
        assert!(Rule::empty().is_empty());
        assert!(Rule::empty().with_name("").is_empty());
        assert!(!Rule::new("a", "").is_empty());
        assert!(!Rule::empty().with_operator(Operator::Not).is_empty());
    }

    #[test]
    fn test_blank_alternative_keeps_selector() {
        let rule = Rule::new("attributes", "red")
            .with_name("color")
            .with_operator(Operator::Not);
        let alt = rule.blank_alternative();

        assert_eq!(alt.path, "attributes");
        assert_eq!(alt.name.as_deref(), Some("color"));
        assert_eq!(alt.operator, None);
        assert_eq!(alt.value, "");
    }

    #[test]
    fn test_query_rules_flattens_groups() {
        let query = Query::new(vec![
            Rule::new("a", "1").into(),
            RuleGroup::new(vec![Rule::new("b", "2"), Rule::new("c", "3")]).into(),
        ]);
        let paths: Vec<&str> = query.rules().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_node_json_shape() {
        let query = Query::new(vec![
            Rule::new("a", "1").into(),
            RuleGroup::new(vec![Rule::new("b", "2")]).into(),
        ]);
        let json = serde_json::to_value(&query).unwrap();
        assert!(json[0].is_object());
        assert!(json[1].is_array());

        let back: Query = serde_json::from_value(json).unwrap();
        assert_eq!(back, query);
    }
}
