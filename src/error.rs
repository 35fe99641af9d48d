/// Error types for koru-lens operations.
///
/// Only configuration-shape problems are errors. Irregular data (a missing
/// field, a non-numeric value, an unparseable date criterion) never surfaces
/// here: it degrades to "excluded" or `null` inside the engines instead.
use thiserror::Error;

/// The main error type for koru-lens operations.
#[derive(Error, Debug)]
pub enum LensError {
    /// The record collection or a required option has the wrong shape.
    #[error("Invalid input: {reason}")]
    InputType {
        /// Description of the offending input
        reason: String,
    },

    /// An aggregation kind outside {sum, avg, min, max, count}.
    #[error("Unknown aggregation kind '{kind}' for field '{field}'")]
    UnknownAggregation {
        /// The field the aggregation was requested for
        field: String,
        /// The rejected kind
        kind: String,
    },

    /// A group sort names a field that is not aggregated.
    #[error("Cannot sort groups by '{field}': field is not aggregated")]
    UnknownAggregate {
        /// The requested sort field
        field: String,
    },

    /// A field name outside the listing schema.
    #[error("Unknown listing field '{field}'")]
    UnknownField {
        /// The unrecognised field name
        field: String,
    },

    /// A field whose type has no total order was used as a sort key.
    #[error("Field '{field}' has no defined ordering and cannot be sorted on")]
    Unorderable {
        /// The rejected field name
        field: String,
    },

    /// Pages must hold at least one record.
    #[error("Invalid page size {size}: must be at least 1")]
    InvalidPageSize {
        /// The rejected size
        size: usize,
    },

    /// A `matches` filter pattern is not a valid regular expression.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Why it failed to compile
        reason: String,
    },

    /// A record failed schema validation.
    #[error("Invalid data: {reason}")]
    InvalidData {
        /// Description of why the data is invalid
        reason: String,
    },

    /// Reading a configuration or data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error when converting data to/from JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LensError {
    pub(crate) fn input_type(reason: impl Into<String>) -> Self {
        Self::InputType {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }
}

/// Result type alias for koru-lens operations.
pub type LensResult<T> = Result<T, LensError>;
