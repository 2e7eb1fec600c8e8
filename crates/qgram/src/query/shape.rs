//! Typed views over a rule's raw value.
//!
//! The codec stores values as plain strings; adapters that render inputs
//! need to know whether a value is a list, a range or a yes/no flag.

use super::model::{Operator, Rule};
use crate::options::OptionType;
use serde::Serialize;

const LIST_SEPARATOR: char = ',';
const RANGE_SEPARATOR: &str = "..";

/// Interpretation of a rule value for a given field type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "value", rename_all = "lowercase")]
pub enum ValueShape {
    Scalar(String),
    /// `from..to`, either side may be blank
    Range(String, String),
    /// `a,b,c` for the `in` operator
    List(Vec<String>),
    /// `true`/`false` for the `isdefined` operator
    Flag(bool),
}

impl ValueShape {
    pub fn of(rule: &Rule, option_type: OptionType) -> Self {
        match rule.operator {
            Some(Operator::In) => ValueShape::List(split_list(&rule.value)),
            Some(Operator::IsDefined) => ValueShape::Flag(rule.value == "true"),
            None if accepts_range(option_type) => match rule.value.split_once(RANGE_SEPARATOR) {
                Some((from, to)) => ValueShape::Range(from.to_string(), to.to_string()),
                None => ValueShape::Scalar(rule.value.clone()),
            },
            _ => ValueShape::Scalar(rule.value.clone()),
        }
    }

    /// Render back into the raw value string
    pub fn to_value(&self) -> String {
        match self {
            ValueShape::Scalar(value) => value.clone(),
            ValueShape::Range(from, to) => format!("{}{}{}", from, RANGE_SEPARATOR, to),
            ValueShape::List(items) => items.join(&LIST_SEPARATOR.to_string()),
            ValueShape::Flag(flag) => flag.to_string(),
        }
    }
}

fn accepts_range(option_type: OptionType) -> bool {
    matches!(
        option_type,
        OptionType::Number | OptionType::Date | OptionType::Any
    )
}

fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(LIST_SEPARATOR).map(str::to_string).collect()
}
