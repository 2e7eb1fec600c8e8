//! qgram: filter query grammar tool
//!
//! Thin command-line front end over the `qgram` library: parse, stringify,
//! normalize, zoom and edit filter query strings.

use anyhow::{Context, Result};
use clap::Parser;
use qgram::cli::{Cli, Commands};
use qgram::options::{OptionSet, OPTIONS_FILE};
use qgram::output::{ErrorCode, ExitCode, JsonError, JsonOutput, OutputContext};
use qgram::query::{self, EditError, Query, ValueShape};
use qgram::ConfigError;
use serde_json::json;
use std::env;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default options directory, relative to the working directory
const OPTIONS_DIR: &str = ".qgram";

/// Map an error chain onto an exit code and JSON error code
fn classify(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            tracing::debug!(kind = ?io_error.kind(), "I/O failure");
            return ErrorCode::IO_ERROR;
        }
        if let Some(config) = cause.downcast_ref::<ConfigError>() {
            return match config {
                ConfigError::Read { .. } => ErrorCode::IO_ERROR,
                _ => ErrorCode::CONFIG_ERROR,
            };
        }
        if cause.downcast_ref::<EditError>().is_some() {
            return ErrorCode::INVALID_ARGUMENT;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return ErrorCode::INVALID_TREE;
        }
    }
    "GENERIC_ERROR"
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    let command_name = command_name(&cli.command);

    let exit_code = match run(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let code = classify(&e);
            let error = match code {
                ErrorCode::INVALID_TREE => JsonError::invalid_tree(format!("{:#}", e), command_name),
                ErrorCode::CONFIG_ERROR => JsonError::config_error(format!("{:#}", e), command_name),
                ErrorCode::INVALID_ARGUMENT => {
                    JsonError::invalid_argument(format!("{:#}", e), command_name)
                }
                _ => JsonError::new(code, format!("{:#}", e), command_name),
            };
            if json {
                match error.to_json_string() {
                    Ok(text) => println!("{}", text),
                    Err(_) => eprintln!("Error: {:#}", e),
                }
            } else {
                eprintln!("Error: {:#}", e);
            }
            error.exit_code()
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

/// Log to stderr, filtered by $QGRAM_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("QGRAM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Parse { .. } => "parse",
        Commands::Stringify { .. } => "stringify",
        Commands::Normalize { .. } => "normalize",
        Commands::Zoom { .. } => "zoom",
        Commands::Edit { .. } => "edit",
        Commands::Options => "options",
    }
}

/// Resolve field options: --options, then $QGRAM_OPTIONS, then .qgram/
fn load_options(explicit: Option<PathBuf>) -> Result<OptionSet> {
    if let Some(path) = explicit.or_else(|| env::var_os("QGRAM_OPTIONS").map(PathBuf::from)) {
        return OptionSet::load_file(&path)
            .with_context(|| format!("Failed to load options from {}", path.display()));
    }

    let dir = env::current_dir()?.join(OPTIONS_DIR);
    OptionSet::load(&dir)
        .with_context(|| format!("Failed to load {}", dir.join(OPTIONS_FILE).display()))
}

fn run(cli: Cli) -> Result<()> {
    let output = OutputContext::new(cli.quiet, cli.json);
    let command_name = command_name(&cli.command);

    match cli.command {
        Commands::Parse { query } => {
            let options = load_options(cli.options)?;
            let tree = query::parse(&query);
            tracing::debug!(nodes = tree.len(), "parsed query");

            output.print_json(&JsonOutput::success(
                json!({ "tree": tree, "zoom": query::derive_zoom(&tree) }),
                command_name,
            ))?;
            print_tree(&output, &tree, &options)?;
        }
        Commands::Stringify { tree } => {
            let input = match tree {
                Some(tree) => tree,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read rule tree from stdin")?;
                    buf
                }
            };
            let tree: Query =
                serde_json::from_str(&input).context("Invalid rule tree JSON")?;
            let search = query::stringify(&tree);

            output.print_json(&JsonOutput::success(json!({ "search": search }), command_name))?;
            output.print_data(&search)?;
        }
        Commands::Normalize { query } => {
            let search = query::normalize(&query);
            output.print_json(&JsonOutput::success(json!({ "search": search }), command_name))?;
            output.print_data(&search)?;
        }
        Commands::Zoom { query } => {
            let zoom = query::derive_zoom(&query::parse(&query));
            output.print_json(&JsonOutput::success(json!({ "zoom": zoom }), command_name))?;
            output.print_data(&zoom)?;
        }
        Commands::Edit { query, command } => {
            let options = load_options(cli.options)?;
            let before = query::parse(&query);
            let editor_command = command.to_command();
            let after = query::try_apply(&before, &editor_command, &options)
                .with_context(|| format!("Cannot apply edit to '{}'", query))?;

            let search = query::stringify(&after);
            output.print_json(&JsonOutput::success(
                json!({
                    "search": search,
                    "zoom": query::derive_zoom(&after),
                    "tree": after,
                }),
                command_name,
            ))?;
            output.print_data(&search)?;
        }
        Commands::Options => {
            let options = load_options(cli.options)?;
            let listed: Vec<_> = options.iter().collect();
            output.print_json(&JsonOutput::success(json!({ "options": listed }), command_name))?;

            if options.is_empty() {
                output.print_info("No field options loaded (unknown paths resolve to 'any')")?;
            }
            for option in &options {
                output.print_data(format_args!(
                    "{:<32} {:<10} {}",
                    option.path,
                    option.option_type,
                    option.label()
                ))?;
            }
        }
    }

    Ok(())
}

/// Human-readable rule tree, one rule per line
fn print_tree(output: &OutputContext, tree: &Query, options: &OptionSet) -> Result<()> {
    if tree.is_empty() {
        output.print_info("(empty query)")?;
        return Ok(());
    }

    for (index, node) in tree.nodes().iter().enumerate() {
        let grouped = node.as_group().is_some();
        for (inner, rule) in node.rules().enumerate() {
            let position = if grouped {
                format!("{}.{}", index, inner)
            } else {
                index.to_string()
            };
            let shape = ValueShape::of(rule, options.resolve_type(&rule.path));
            output.print_data(format_args!(
                "{:<5} {}{:<20} {}",
                position,
                if grouped && inner > 0 { "| " } else { "" },
                query::compose_key(rule),
                describe(&shape)
            ))?;
        }
    }
    Ok(())
}

fn describe(shape: &ValueShape) -> String {
    match shape {
        ValueShape::Scalar(value) => format!("= {:?}", value),
        ValueShape::Range(from, to) => format!("in range {:?}..{:?}", from, to),
        ValueShape::List(items) => format!("one of {:?}", items),
        ValueShape::Flag(flag) => format!("defined: {}", flag),
    }
}
