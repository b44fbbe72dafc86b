use thiserror::Error;

/// Errors raised by the analytical core. All are local and synchronous;
/// none warrant retries.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown indicator code: {0}")]
    NotFound(String),

    #[error("insufficient data for {indicator}: no observations")]
    InsufficientData { indicator: String },

    #[error("invalid scenario configuration: {0}")]
    InvalidConfiguration(String),
}
