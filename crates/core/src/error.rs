//! Error model shared across the storefront crates.

use thiserror::Error;

/// Result type used by catalog validation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type used by the filter pipeline.
pub type FilterResult<T> = Result<T, FilterError>;

/// Domain-level error.
///
/// Deterministic failures of catalog data (validation and identifiers).
/// Never shown to the shopper.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. negative price, rating out of range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty product id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Recoverable failures of the filter pipeline.
///
/// All variants are handled where they occur: the worst visible outcome is an
/// inert control or an unfiltered list, never a broken page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The catalog has not finished loading; filtering must no-op.
    #[error("catalog data not ready")]
    DataNotReady,

    /// A price field held something that is not a non-negative number.
    #[error("malformed numeric input in {field}: {input:?}")]
    MalformedNumericInput { field: &'static str, input: String },

    /// A control or container the controller expects is absent.
    #[error("missing DOM target: {0}")]
    MissingDomTarget(String),
}

impl FilterError {
    pub fn malformed(field: &'static str, input: impl Into<String>) -> Self {
        Self::MalformedNumericInput {
            field,
            input: input.into(),
        }
    }

    pub fn missing(target: impl Into<String>) -> Self {
        Self::MissingDomTarget(target.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        assert_eq!(
            FilterError::malformed("min-price", "12abc").to_string(),
            "malformed numeric input in min-price: \"12abc\""
        );
        assert_eq!(
            FilterError::missing("#products-container").to_string(),
            "missing DOM target: #products-container"
        );
        assert_eq!(
            DomainError::validation("rating must be 1..=5").to_string(),
            "validation failed: rating must be 1..=5"
        );
    }
}
