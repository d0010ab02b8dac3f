// errors.rs
use crate::forecast::ForecastError;
use std::fmt;

/// Errors originating from either the server logic
/// (routing, missing resources, bad input) or downstream layers (DB, forecasting, export).
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    /// Well-formed request the data cannot answer (too few sales, year out of reach).
    Unprocessable(String),
    DbError(String),
    XlsxError(String),
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Forbidden(_) => 403,
            ServerError::Conflict(_) => 409,
            ServerError::Unprocessable(_) => 422,
            ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => 500,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ServerError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ServerError::Unprocessable(msg) => write!(f, "Unprocessable: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Spreadsheet Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl From<ForecastError> for ServerError {
    fn from(e: ForecastError) -> Self {
        match e {
            ForecastError::InvalidSettings(msg) => ServerError::BadRequest(msg),
            other => ServerError::Unprocessable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("Invalid JSON: {e}"))
    }
}
