//! Rule tree editor: pure transitions over [`Query`] values.
//!
//! Every transition takes the current query by reference and returns a new
//! one. Commands that do not fit the query (index out of range, a group edit
//! aimed at a plain rule) return an unchanged copy from [`apply`] and an
//! [`EditError`] from [`try_apply`].

use super::model::{Node, Operator, Query, Rule, RuleGroup};
use crate::options::{OptionSet, OptionType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural edit of the top-level sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Push a blank draft rule
    AppendEmpty,
    /// Replace the element at `index`
    Replace { index: usize, node: Node },
    /// Remove the element at `index`
    Delete { index: usize },
    /// Turn the rule at `index` into an OR-group seeded with a blank alternative
    ConvertToGroup { index: usize },
    /// Edit member `inner` of the group at `index`
    UpdateGroup {
        index: usize,
        inner: usize,
        edit: GroupEdit,
    },
    /// Advance the operator of the rule at `index`
    CycleOperator { index: usize },
}

/// Edit applied inside an OR-group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit", content = "rule", rename_all = "snake_case")]
pub enum GroupEdit {
    /// Push a blank alternative at the end of the group
    Append,
    Replace(Rule),
    Delete,
    /// Insert a blank copy of the member right after it
    Branch,
    CycleOperator,
}

/// Reasons a command does not fit the query it is applied to
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Index {index} out of range for a query of {len} element(s)")]
    OutOfRange { index: usize, len: usize },
    #[error("Alternative {inner} out of range for group {index} of {len} rule(s)")]
    AlternativeOutOfRange {
        index: usize,
        inner: usize,
        len: usize,
    },
    #[error("Element {index} is an OR-group, expected a rule")]
    NotARule { index: usize },
    #[error("Element {index} is a rule, expected an OR-group")]
    NotAGroup { index: usize },
}

/// Apply one command to a query, returning the new query.
///
/// A command that does not fit leaves the query as it was.
pub fn apply(query: &Query, command: &Command, options: &OptionSet) -> Query {
    try_apply(query, command, options).unwrap_or_else(|error| {
        tracing::debug!(?command, %error, "editor command does not fit query");
        query.clone()
    })
}

/// Apply one command, reporting why it does not fit instead of ignoring it.
pub fn try_apply(query: &Query, command: &Command, options: &OptionSet) -> Result<Query, EditError> {
    let mut nodes = query.nodes().to_vec();
    let len = nodes.len();
    let out_of_range = |index: usize| EditError::OutOfRange { index, len };

    match command {
        Command::AppendEmpty => nodes.push(Node::Rule(Rule::empty())),
        Command::Replace { index, node } => {
            let slot = nodes.get_mut(*index).ok_or_else(|| out_of_range(*index))?;
            *slot = node.clone();
            settle(&mut nodes, *index);
        }
        Command::Delete { index } => {
            if *index >= len {
                return Err(out_of_range(*index));
            }
            nodes.remove(*index);
        }
        Command::ConvertToGroup { index } => match nodes.get_mut(*index) {
            Some(Node::Rule(rule)) => {
                let alternative = rule.blank_alternative();
                let original = std::mem::take(rule);
                nodes[*index] = Node::Group(RuleGroup::new(vec![original, alternative]));
            }
            Some(Node::Group(_)) => return Err(EditError::NotARule { index: *index }),
            None => return Err(out_of_range(*index)),
        },
        Command::UpdateGroup { index, inner, edit } => match nodes.get_mut(*index) {
            Some(Node::Group(group)) => {
                edit_group(group, *index, *inner, edit, options)?;
                settle(&mut nodes, *index);
            }
            Some(Node::Rule(_)) => return Err(EditError::NotAGroup { index: *index }),
            None => return Err(out_of_range(*index)),
        },
        Command::CycleOperator { index } => match nodes.get_mut(*index) {
            Some(Node::Rule(rule)) => rule.operator = next_operator(rule, options),
            Some(Node::Group(_)) => return Err(EditError::NotARule { index: *index }),
            None => return Err(out_of_range(*index)),
        },
    }

    Ok(Query::new(nodes))
}

fn edit_group(
    group: &mut RuleGroup,
    index: usize,
    inner: usize,
    edit: &GroupEdit,
    options: &OptionSet,
) -> Result<(), EditError> {
    let rules = &mut group.rules;
    if !matches!(edit, GroupEdit::Append) && inner >= rules.len() {
        return Err(EditError::AlternativeOutOfRange {
            index,
            inner,
            len: rules.len(),
        });
    }

    match edit {
        GroupEdit::Append => rules.push(Rule::empty()),
        GroupEdit::Replace(rule) => rules[inner] = rule.clone(),
        GroupEdit::Delete => {
            rules.remove(inner);
        }
        GroupEdit::Branch => {
            let alternative = rules[inner].blank_alternative();
            rules.insert(inner + 1, alternative);
        }
        GroupEdit::CycleOperator => {
            let rule = &mut rules[inner];
            rule.operator = next_operator(rule, options);
        }
    }
    Ok(())
}

/// Collapse a singleton group to a plain rule and drop an empty one.
fn settle(nodes: &mut Vec<Node>, index: usize) {
    let Node::Group(group) = &mut nodes[index] else {
        return;
    };
    match group.rules.len() {
        0 => {
            nodes.remove(index);
        }
        1 => {
            let rule = group.rules.remove(0);
            nodes[index] = Node::Rule(rule);
        }
        _ => {}
    }
}

/// Operators a rule may cycle through, in click order.
///
/// Implicit equality (`None`) is not listed; the cycle starts and ends there.
pub fn operator_candidates(option_type: OptionType, named: bool) -> Vec<Operator> {
    use Operator::*;

    const COMPARISONS: [Operator; 6] = [
        In,
        Not,
        GreaterThan,
        LessThan,
        GreaterThanOrEqual,
        LessThanOrEqual,
    ];

    match option_type {
        OptionType::Number | OptionType::Any => COMPARISONS.to_vec(),
        OptionType::Date => vec![
            Not,
            GreaterThan,
            LessThan,
            GreaterThanOrEqual,
            LessThanOrEqual,
        ],
        OptionType::String => vec![In, Not],
        OptionType::Boolean => vec![Not],
        OptionType::Attribute => {
            let mut ops = COMPARISONS.to_vec();
            if named {
                ops.push(IsDefined);
            }
            ops
        }
    }
}

/// Operator following the rule's current one for its resolved type.
pub fn next_operator(rule: &Rule, options: &OptionSet) -> Option<Operator> {
    let named = rule.name.is_some();
    let candidates = operator_candidates(options.resolve_type(&rule.path), named);

    match rule.operator {
        None => candidates.first().copied(),
        Some(current) => candidates
            .iter()
            .position(|op| *op == current)
            .and_then(|pos| candidates.get(pos + 1))
            .copied(),
    }
}

/// Append a blank draft rule unless the query already ends with one.
pub fn ensure_draft(query: &Query) -> Query {
    match query.nodes().last() {
        Some(Node::Rule(rule)) if rule.is_empty() => query.clone(),
        _ => apply(query, &Command::AppendEmpty, &OptionSet::default()),
    }
}
