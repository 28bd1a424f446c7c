//! Error types for unit grouping.

use std::fmt;

use thiserror::Error;

use crate::threshold::MergeThresholdKind;

/// Field of a minimum unit that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitField {
    Text,
    Confidence,
    Corners,
}

impl fmt::Display for UnitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitField::Text => "text",
            UnitField::Confidence => "confidence",
            UnitField::Corners => "corners",
        };
        f.write_str(name)
    }
}

/// Primary error type for grouping operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupingError {
    #[error("invalid unit at index {index}: {field} {reason}")]
    InvalidUnit {
        index: usize,
        field: UnitField,
        reason: String,
    },

    #[error("invalid grouping parameter {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("no merge threshold strategy registered for {0:?}")]
    UnregisteredStrategy(MergeThresholdKind),

    #[error("cannot combine an empty run of units into a region")]
    EmptyRegion,
}

/// Result type alias for grouping operations.
pub type Result<T> = std::result::Result<T, GroupingError>;
