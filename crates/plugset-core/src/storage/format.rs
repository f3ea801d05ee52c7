use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::error::{StorageResult, StorageSystemError};
use crate::storage::tree::SettingsTree;
use crate::storage::xml;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// XML markup (.xml), the native settings layout
    Xml,
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl DocumentFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Xml => "xml",
            DocumentFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            DocumentFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            DocumentFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "xml" => Some(DocumentFormat::Xml),
                "json" => Some(DocumentFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(DocumentFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(DocumentFormat::Toml),
                _ => None,
            })
    }

    /// Parse a document tree in this format
    pub fn parse_tree(&self, data: &str) -> Result<SettingsTree, ParseFailure> {
        match self {
            DocumentFormat::Xml => xml::parse(data),
            _ => from_str(data, *self),
        }
    }

    /// Render a document tree in this format
    pub fn write_tree(&self, tree: &SettingsTree) -> StorageResult<String> {
        match self {
            DocumentFormat::Xml => xml::write(tree),
            _ => to_string(tree, *self),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where and why a document failed to parse. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseFailure {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Locate a byte offset within `input`
    pub fn at_offset(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(input.len());
        let consumed = &input.as_bytes()[..offset];
        let line = consumed.iter().filter(|b| **b == b'\n').count() + 1;
        let line_start = consumed
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        Self::new(line, offset - line_start + 1, message)
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
    }
}

/// Deserialize a serde value from one of the structured formats
pub fn from_str<T: DeserializeOwned>(data: &str, format: DocumentFormat) -> Result<T, ParseFailure> {
    match format {
        DocumentFormat::Xml => Err(ParseFailure::new(
            1,
            1,
            "XML documents can only be read as element trees",
        )),
        DocumentFormat::Json => serde_json::from_str(data)
            .map_err(|e| ParseFailure::new(e.line().max(1), e.column().max(1), e.to_string())),
        #[cfg(feature = "yaml-config")]
        DocumentFormat::Yaml => serde_yaml::from_str(data).map_err(|e| match e.location() {
            Some(location) => ParseFailure::new(location.line(), location.column(), e.to_string()),
            None => ParseFailure::new(1, 1, e.to_string()),
        }),
        #[cfg(feature = "toml-config")]
        DocumentFormat::Toml => toml::from_str(data).map_err(|e| match e.span() {
            Some(span) => ParseFailure::at_offset(data, span.start, e.message()),
            None => ParseFailure::new(1, 1, e.message()),
        }),
    }
}

/// Serialize a serde value into one of the structured formats
pub fn to_string<T: Serialize>(value: &T, format: DocumentFormat) -> StorageResult<String> {
    match format {
        DocumentFormat::Xml => Err(StorageSystemError::UnsupportedFormat(
            "xml cannot encode arbitrary values".to_string(),
        )),
        DocumentFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| StorageSystemError::serialization("json", e)),
        #[cfg(feature = "yaml-config")]
        DocumentFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| StorageSystemError::serialization("yaml", e)),
        #[cfg(feature = "toml-config")]
        DocumentFormat::Toml => toml::to_string_pretty(value)
            .map_err(|e| StorageSystemError::serialization("toml", e)),
    }
}
