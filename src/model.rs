pub mod blend_shapes;
pub mod morph_targets;
pub mod options;

use std::fmt::Display;

pub use blend_shapes::*;
pub use morph_targets::*;
pub use options::*;

/// Configuration or asset data that cannot be used.
///
/// Only raised while loading, never while building or playing timelines.
#[derive(Debug)]
pub enum InvalidConfigError {
    Io {
        path: String,
        error: std::io::Error,
    },
    Parse(serde_json::Error),
    Empty,
    NegativeIndex {
        name: String,
        index: i64,
    },
    IndexOutOfRange {
        name: String,
        index: i64,
        len: usize,
    },
    DuplicateIndex {
        index: usize,
        first: String,
        second: String,
    },
    DuplicateName(String),
    InvalidOption {
        option: &'static str,
        reason: String,
    },
}

impl Display for InvalidConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, error } => write!(f, "Unable to read {path}: {error}"),
            Self::Parse(e) => write!(f, "Unable to parse config: {e}"),
            Self::Empty => write!(f, "Morph target table has no entries"),
            Self::NegativeIndex { name, index } => {
                write!(f, "Morph target {name} has negative index {index}")
            }
            Self::IndexOutOfRange { name, index, len } => write!(
                f,
                "Morph target {name} has index {index}, expected less than {len}"
            ),
            Self::DuplicateIndex {
                index,
                first,
                second,
            } => write!(f, "Morph targets {first} and {second} share index {index}"),
            Self::DuplicateName(name) => write!(f, "Morph target {name} appears more than once"),
            Self::InvalidOption { option, reason } => write!(f, "Invalid {option}: {reason}"),
        }
    }
}

impl std::error::Error for InvalidConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for InvalidConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Read a whole file, attaching the path to any failure.
pub(crate) fn read_file(path: &std::path::Path) -> Result<String, InvalidConfigError> {
    std::fs::read_to_string(path).map_err(|error| InvalidConfigError::Io {
        path: path.display().to_string(),
        error,
    })
}
