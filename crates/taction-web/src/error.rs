#![forbid(unsafe_code)]

use taction_core::ConfigError;
use thiserror::Error;

/// Failure to bind swipe tracking to DOM elements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An element in the collection already carries a tracker.
    #[error("element is already bound to a swipe tracker")]
    AlreadyBound,

    #[error("no document is available in this context")]
    NoDocument,

    /// A DOM call threw.
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_pass_through() {
        let err: TrackError = ConfigError::InvalidThreshold { value: f64::NAN }.into();
        assert_eq!(
            err.to_string(),
            "invalid swipe threshold NaN: must be finite and >= 0"
        );
        assert!(matches!(err, TrackError::Config(_)));
    }

    #[test]
    fn dom_message() {
        assert_eq!(
            TrackError::Dom("SyntaxError".into()).to_string(),
            "DOM operation failed: SyntaxError"
        );
    }
}
