#![forbid(unsafe_code)]

use thiserror::Error;

/// Bind-time configuration failure.
///
/// Gesture-time anomalies never surface as errors; they are logged and the
/// tracker falls back to idle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid swipe axis {value:?} (expected \"horizontal\", \"vertical\" or \"all\")")]
    InvalidAxis { value: String },

    #[error("invalid swipe threshold {value}: must be finite and >= 0")]
    InvalidThreshold { value: f64 },
}
