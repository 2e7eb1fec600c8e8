//! Command-line interface definitions using clap.

use crate::query::{self, Command, GroupEdit, Node, Rule};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Filter query grammar tool
///
/// Parses, edits and re-encodes admin console filter query strings such as
/// `status=approved|status%3Anot%3Ddeclined&total:greaterthan=10`.
///
/// Field options are read from --options, then $QGRAM_OPTIONS, then
/// `.qgram/options.toml` in the current directory.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or input
///  10  - External failure (file system, etc.)
#[derive(Parser)]
#[command(name = "qgram")]
#[command(about = "Filter query grammar tool", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Field options file (TOML with [[option]] tables)
    #[arg(long, global = true, value_name = "FILE")]
    pub options: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the rule tree of a query string
    Parse {
        /// Query string, e.g. 'a=1&b:not=2'
        query: String,
    },

    /// Encode a JSON rule tree as a query string
    Stringify {
        /// JSON rule tree (read from stdin when omitted)
        tree: Option<String>,
    },

    /// Re-encode a query string in canonical form
    Normalize { query: String },

    /// Print the relations a query needs eager-loaded
    Zoom { query: String },

    /// Apply one editor command and print the resulting query
    Edit {
        query: String,

        #[command(subcommand)]
        command: EditCommands,
    },

    /// List the loaded field options
    Options,
}

/// Editor commands. Indices are zero-based.
#[derive(Subcommand)]
pub enum EditCommands {
    /// Append a blank draft rule
    Append,

    /// Replace the element at INDEX with a query entry ('key=value', '|' allowed)
    Replace { index: usize, entry: String },

    /// Delete the element at INDEX
    Delete { index: usize },

    /// Turn the rule at INDEX into an OR-group
    Group { index: usize },

    /// Advance the operator of the rule at INDEX
    Cycle { index: usize },

    /// Append a blank alternative to the group at INDEX
    AltAppend { index: usize },

    /// Replace alternative INNER of the group at INDEX with a 'key=value' entry
    AltReplace {
        index: usize,
        inner: usize,
        entry: String,
    },

    /// Delete alternative INNER of the group at INDEX
    AltDelete { index: usize, inner: usize },

    /// Insert a blank copy after alternative INNER of the group at INDEX
    AltBranch { index: usize, inner: usize },

    /// Advance the operator of alternative INNER of the group at INDEX
    AltCycle { index: usize, inner: usize },
}

impl EditCommands {
    /// Editor command this CLI invocation stands for
    pub fn to_command(&self) -> Command {
        let group = |index: usize, inner: usize, edit: GroupEdit| Command::UpdateGroup {
            index,
            inner,
            edit,
        };

        match self {
            EditCommands::Append => Command::AppendEmpty,
            EditCommands::Replace { index, entry } => Command::Replace {
                index: *index,
                node: entry_node(entry),
            },
            EditCommands::Delete { index } => Command::Delete { index: *index },
            EditCommands::Group { index } => Command::ConvertToGroup { index: *index },
            EditCommands::Cycle { index } => Command::CycleOperator { index: *index },
            EditCommands::AltAppend { index } => group(*index, 0, GroupEdit::Append),
            EditCommands::AltReplace {
                index,
                inner,
                entry,
            } => group(*index, *inner, GroupEdit::Replace(entry_rule(entry))),
            EditCommands::AltDelete { index, inner } => group(*index, *inner, GroupEdit::Delete),
            EditCommands::AltBranch { index, inner } => group(*index, *inner, GroupEdit::Branch),
            EditCommands::AltCycle { index, inner } => {
                group(*index, *inner, GroupEdit::CycleOperator)
            }
        }
    }
}

/// First node of a query entry; a blank entry is a blank rule
fn entry_node(entry: &str) -> Node {
    query::parse(entry)
        .into_nodes()
        .into_iter()
        .next()
        .unwrap_or_else(|| Node::Rule(Rule::empty()))
}

/// Single `key=value` rule; `|` is part of the value here
fn entry_rule(entry: &str) -> Rule {
    let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
    query::decode(key, value)
}
