//! # Store Values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Separator for path lists given as a single string.
pub const PATH_LIST_SEPARATOR: char = ';';

/// A value held in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreValue {
    /// Text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A single path.
    Path(PathBuf),
    /// An ordered path list.
    PathList(Vec<PathBuf>),
    /// A flag.
    Flag(bool),
    /// An integer.
    Integer(i64),
}

impl StoreValue {
    /// Short shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Path(_) => "path",
            Self::PathList(_) => "path list",
            Self::Flag(_) => "flag",
            Self::Integer(_) => "integer",
        }
    }

    /// Interpret as a single path. Text is accepted.
    pub fn as_path(&self) -> Option<PathBuf> {
        match self {
            Self::Path(p) => Some(p.clone()),
            Self::Text(s) if !s.is_empty() => Some(PathBuf::from(s)),
            _ => None,
        }
    }

    /// Interpret as a path list. Text is split on `;`, empty segments dropped.
    pub fn as_path_list(&self) -> Option<Vec<PathBuf>> {
        match self {
            Self::PathList(paths) => Some(paths.clone()),
            Self::Path(p) => Some(vec![p.clone()]),
            Self::Text(s) => Some(
                s.split(PATH_LIST_SEPARATOR)
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .map(PathBuf::from)
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Interpret as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret as bytes. Text is taken as its UTF-8 encoding.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for StoreValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<PathBuf> for StoreValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for StoreValue {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<PathBuf>> for StoreValue {
    fn from(value: Vec<PathBuf>) -> Self {
        Self::PathList(value)
    }
}

impl From<bool> for StoreValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
