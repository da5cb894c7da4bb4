//! Protocol error types.

use thiserror::Error;

/// Protocol-level failures; the service maps each onto an HTTP status.
#[derive(Debug, Error, PartialEq)]
pub enum FeaturesError {
    /// Collection not found.
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    /// Feature not found.
    #[error("Feature '{0}' not found")]
    FeatureNotFound(String),

    /// Invalid query parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Geometry text could not be parsed.
    #[error("Invalid WKT: {0}")]
    InvalidWkt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FeaturesError::CollectionNotFound("rivers".into()).to_string(),
            "Collection 'rivers' not found"
        );
        assert_eq!(
            FeaturesError::FeatureNotFound("7".into()).to_string(),
            "Feature '7' not found"
        );
        assert!(FeaturesError::InvalidWkt("bad".into())
            .to_string()
            .starts_with("Invalid WKT"));
    }
}
