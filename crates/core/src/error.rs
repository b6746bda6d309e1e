//! Error types for the color pipeline.

use thiserror::Error;

/// Errors produced by color parsing and builder construction.
///
/// Numeric conversions and gamut mapping never fail; every error here comes
/// from malformed input.
#[derive(Debug, Error)]
pub enum ColorError {
    /// A string was not a strict 6-digit hex color.
    #[error("invalid hex color '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    /// A gradient was constructed without any color stops.
    #[error("gradient requires at least 1 color stop")]
    EmptyGradient,

    /// A theme document could not be turned into builders.
    #[error("invalid theme: {0}")]
    InvalidTheme(String),

    /// A theme lookup named a color that does not exist.
    #[error("unknown color: {0}")]
    UnknownColor(String),
}

impl ColorError {
    pub(crate) fn invalid_hex(input: &str, reason: impl Into<String>) -> Self {
        ColorError::InvalidHex {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
