//! Query grammar engine for filter query strings.
//!
//! Filters are URL query strings such as
//! `status=approved|status%3Anot%3Ddeclined&total:greaterthan=10`:
//! `&` composes rules with AND, `|` opens an OR-group, and each key carries a
//! field path, an optional `[attribute]` selector and an optional
//! `:operator` suffix.
//!
//! # Architecture
//!
//! 1. **Parser** (`parse`, `stringify`): query string to rule tree and back
//! 2. **Codec** (`decode`, `encode`): one `key=value` token to a [`Rule`]
//! 3. **Zoom** (`derive_zoom`): relations to eager-load for the filter
//! 4. **Editor** (`apply`): pure [`Command`] transitions over the tree
//!
//! # Examples
//!
//! ```
//! use qgram::query::{derive_zoom, parse, stringify};
//!
//! let query = parse("customer:email:not=a%40example.com&total=5..10");
//! assert_eq!(derive_zoom(&query), "customer");
//! assert_eq!(stringify(&query), "customer%3Aemail%3Anot=a%40example.com&total=5..10");
//! ```

mod codec;
mod editor;
mod model;
mod parser;
mod shape;
mod zoom;

pub use codec::{compose_key, decode, decode_component, encode, encode_component};
pub use editor::{
    apply, ensure_draft, next_operator, operator_candidates, try_apply, Command, EditError,
    GroupEdit,
};
pub use model::{Node, Operator, Query, Rule, RuleGroup};
pub use parser::{normalize, parse, stringify};
pub use shape::ValueShape;
pub use zoom::{derive_zoom, relation_of};

use crate::options::OptionSet;

/// A filter bound to the field options of one usage site.
///
/// Holds the current rule tree; every edit returns a new `Filter`, leaving
/// this one as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    query: Query,
    options: OptionSet,
}

impl Filter {
    /// Parse a query string against the given options
    ///
    /// # Examples
    ///
    /// ```
    /// use qgram::options::OptionSet;
    /// use qgram::query::{Command, Filter};
    ///
    /// let filter = Filter::parse("total=5", OptionSet::default());
    /// let next = filter.apply(&Command::CycleOperator { index: 0 });
    /// assert_eq!(next.search(), "total%3Ain=5");
    /// assert_eq!(filter.search(), "total=5");
    /// ```
    pub fn parse(search: &str, options: OptionSet) -> Self {
        Filter {
            query: parse(search),
            options,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Apply an editor command, returning the edited filter
    pub fn apply(&self, command: &Command) -> Self {
        Filter {
            query: apply(&self.query, command, &self.options),
            options: self.options.clone(),
        }
    }

    /// Canonical query string
    pub fn search(&self) -> String {
        stringify(&self.query)
    }

    pub fn zoom(&self) -> String {
        derive_zoom(&self.query)
    }

    /// Value shape of every rule, in traversal order
    pub fn shapes(&self) -> Vec<ValueShape> {
        self.query
            .rules()
            .map(|rule| ValueShape::of(rule, self.options.resolve_type(&rule.path)))
            .collect()
    }
}
