//! Structured output formatting for CLI commands.
//!
//! Every command prints either plain text or a JSON envelope with
//! `success`, `data`/`error` and `metadata`, so scripts can consume results.

use chrono::Utc;
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::io::{self, Write};

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context
// ============================================================================

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print informational message (suppressed by --quiet or --json)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print a JSON envelope (only in --json mode)
    pub fn print_json<T: Serialize>(&self, output: &JsonOutput<T>) -> io::Result<()> {
        if self.json {
            let text = output.to_json_string().map_err(io::Error::other)?;
            writeln_safe(&text)
        } else {
            Ok(())
        }
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Expected when piping to head and similar
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.error.suggestions.push(suggestion.into());
        self
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exit code matching this error's code
    pub fn exit_code(&self) -> ExitCode {
        ErrorCode::to_exit_code(&self.error.code)
    }

    pub fn invalid_tree(message: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(ErrorCode::INVALID_TREE, message, command)
            .with_suggestion("Pass the JSON printed by 'qgram --json parse <QUERY>' (its data.tree field)")
    }

    pub fn invalid_argument(message: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(ErrorCode::INVALID_ARGUMENT, message, command)
            .with_suggestion("Run 'qgram parse <QUERY>' to see element and alternative indices")
    }

    pub fn config_error(message: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(ErrorCode::CONFIG_ERROR, message, command)
            .with_suggestion("Check the [[option]] tables in your options.toml")
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "INVALID_TREE", "CONFIG_ERROR")
    pub code: String,
    pub message: String,
    /// Suggested actions to resolve the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Standardized exit codes for the qgram CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,
    /// Generic error (1)
    GenericError = 1,
    /// Invalid arguments or input (2)
    InvalidArgument = 2,
    /// File system or other external failure (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes used in JSON error envelopes
pub struct ErrorCode;

impl ErrorCode {
    pub const INVALID_ARGUMENT: &'static str = "INVALID_ARGUMENT";
    pub const INVALID_TREE: &'static str = "INVALID_TREE";
    pub const CONFIG_ERROR: &'static str = "CONFIG_ERROR";
    pub const IO_ERROR: &'static str = "IO_ERROR";

    /// Map error code string to exit code
    pub fn to_exit_code(code: &str) -> ExitCode {
        match code {
            Self::INVALID_ARGUMENT | Self::INVALID_TREE | Self::CONFIG_ERROR => {
                ExitCode::InvalidArgument
            }
            Self::IO_ERROR => ExitCode::ExternalError,
            _ => ExitCode::GenericError,
        }
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Metadata included in all responses
#[derive(Debug, Serialize)]
pub struct Metadata {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

/// Serialize timestamp in ISO 8601 format
fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}
