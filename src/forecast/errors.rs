// src/forecast/errors.rs

/// Failures of the forecasting pipeline. Returned to the caller as-is;
/// nothing in the pipeline substitutes a default forecast.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No forecast points fall in {0}; choose a closer year")]
    NoForecastForYear(i32),

    #[error("Invalid forecast settings: {0}")]
    InvalidSettings(String),

    #[error("Forecast model error: {0}")]
    Model(String),
}
