//! Error taxonomy for the recommendation engine.
//!
//! Collaborator failures are always caught at the point of use and degrade
//! the affected source to empty output; they only surface as
//! [`EngineError::Collaborator`] to code that explicitly asks for the strict
//! variant of an operation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A title or id has no match in the catalog.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required backing structure is absent or malformed, e.g. a
    /// similarity matrix whose size does not match the catalog.
    #[error("Ranker unavailable: {0}")]
    RankerUnavailable(String),

    /// An external lookup failed. Never rethrown to the end caller by the
    /// blender or the mood filter.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),
}

impl EngineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }

    pub fn unavailable(why: impl Into<String>) -> Self {
        EngineError::RankerUnavailable(why.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::not_found("movie 'Solaris'");
        assert_eq!(err.to_string(), "Not found: movie 'Solaris'");

        let err = EngineError::unavailable("similarity matrix is 3x3, catalog has 5 movies");
        assert!(err.to_string().starts_with("Ranker unavailable"));
    }

    #[test]
    fn test_collaborator_error_wraps_anyhow() {
        let inner = anyhow::anyhow!("connection refused");
        let err: EngineError = inner.into();
        assert!(matches!(err, EngineError::Collaborator(_)));
    }
}
