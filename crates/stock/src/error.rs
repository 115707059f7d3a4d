use thiserror::Error;

/// Errors from stock configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StockError {
    #[error("Invalid thresholds: minimum {minimum} must not exceed maximum {maximum}")]
    InvalidThresholds { minimum: f64, maximum: f64 },

    #[error("Threshold '{name}' must be a finite number")]
    NonFiniteThreshold { name: &'static str },

    #[error("Alias list for '{field}' is empty")]
    EmptyAliases { field: &'static str },
}

pub type Result<T> = std::result::Result<T, StockError>;
