use thiserror::Error;

/// Rejected tunable parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("stress capacity must be positive, got {0}")]
    NonPositiveCapacity(f32),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f32,
        value: f32,
    },

    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    #[error("an outburst must emit at least one impulse")]
    EmptyOutburst,
}
