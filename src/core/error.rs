use thiserror::Error;

/// Errors raised by the matching and statistics engines.
///
/// Every variant is raised at the point of detection; no partial results are
/// returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssociationError {
    /// A required table has zero rows
    #[error("Empty input: the {0} table has no rows")]
    EmptyInput(String),

    /// An out-of-range threshold or an unrecognized option
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A statistic has nothing to evaluate
    #[error("Division by zero: {0}")]
    DivideByZero(String),

    /// A required column is absent or holds values of the wrong kind or range
    #[error("Schema error: {0}")]
    Schema(String),
}

impl AssociationError {
    pub(crate) fn empty(table: &str) -> Self {
        Self::EmptyInput(table.to_string())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
