//! Filter Query Grammar Engine
//!
//! Parses admin console filter query strings into an editable rule tree,
//! applies interactive edits as pure transitions, derives the `zoom`
//! relations the hypermedia API needs, and serializes the tree back into a
//! canonical percent-encoded query string.

pub mod cli;
pub mod options;
pub mod output;
pub mod query;

// Re-export commonly used types
pub use options::{ConfigError, FieldOption, OptionSet, OptionType};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use query::{Command, Filter, GroupEdit, Node, Operator, Query, Rule, RuleGroup};
