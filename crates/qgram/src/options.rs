//! Field option metadata and its TOML loading.
//!
//! Options describe the known filterable fields of one usage site (label,
//! type, allowed values). The engine only reads them; paths that no option
//! describes resolve to [`OptionType::Any`].
//!
//! ```toml
//! [[option]]
//! path = "total"
//! label = "Total"
//! type = "number"
//!
//! [[option]]
//! path = "status"
//! type = "string"
//! list = ["approved", "declined"]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// File name looked up inside an options directory
pub const OPTIONS_FILE: &str = "options.toml";

/// Value type of a field, driving operator candidates and value shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Attribute,
    Boolean,
    String,
    Number,
    Date,
    #[default]
    Any,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Attribute => "attribute",
            OptionType::Boolean => "boolean",
            OptionType::String => "string",
            OptionType::Number => "number",
            OptionType::Date => "date",
            OptionType::Any => "any",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attribute" => Ok(OptionType::Attribute),
            "boolean" => Ok(OptionType::Boolean),
            "string" => Ok(OptionType::String),
            "number" => Ok(OptionType::Number),
            "date" => Ok(OptionType::Date),
            "any" => Ok(OptionType::Any),
            other => Err(ConfigError::UnknownType(other.to_string())),
        }
    }
}

/// A known field that rules can filter on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub path: String,
    /// Display label (defaults to the path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub option_type: OptionType,
    /// Allowed values, when the field is an enumeration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<String>>,
    /// Layout group for adapters that cluster options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FieldOption {
    pub fn new(path: impl Into<String>, option_type: OptionType) -> Self {
        FieldOption {
            path: path.into(),
            label: None,
            option_type,
            list: None,
            group: None,
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.path)
    }
}

/// Errors raised while loading field options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown option type: '{0}' (expected attribute, boolean, string, number, date or any)")]
    UnknownType(String),
    #[error("Empty option path at entry {0}")]
    EmptyPath(usize),
}

#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    option: Vec<FieldOption>,
}

/// Ordered lookup table of field options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<FieldOption>,
}

impl OptionSet {
    pub fn new(options: Vec<FieldOption>) -> Self {
        OptionSet { options }
    }

    /// Load `options.toml` from a directory.
    ///
    /// A missing file yields an empty set; a malformed one is an error.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(OPTIONS_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no options file, using defaults");
            return Ok(OptionSet::default());
        }
        Self::load_file(&path)
    }

    /// Load options from an explicit file path
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), count = set.len(), "loaded field options");
        Ok(set)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = toml::from_str(content)?;
        if let Some(index) = file.option.iter().position(|o| o.path.is_empty()) {
            return Err(ConfigError::EmptyPath(index));
        }
        Ok(OptionSet::new(file.option))
    }

    pub fn get(&self, path: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.path == path)
    }

    /// Type of the field at `path`, `Any` when unknown
    pub fn resolve_type(&self, path: &str) -> OptionType {
        self.get(path).map(|o| o.option_type).unwrap_or_default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a FieldOption;
    type IntoIter = std::slice::Iter<'a, FieldOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
