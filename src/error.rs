//! Error taxonomy for the settings subsystem.
//!
//! # Design Decisions
//! - One enum for every failure a caller can observe
//! - `kind()` is the machine-checkable classification; `Display` is the message
//! - Lower-layer failures (`Io`, `Config`) classify as system errors and
//!   propagate unchanged

use serde::Serialize;

use crate::config::loader::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

/// Machine-checkable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    BadRequest,
    ValidationError,
    SystemError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::PermissionDenied => "NoPermissionError",
            ErrorKind::BadRequest => "BadRequestError",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::SystemError => "InternalServerError",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    System(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::Validation(_) => ErrorKind::ValidationError,
            Error::System(_) | Error::Io(_) | Error::Config(_) => ErrorKind::SystemError,
        }
    }

    pub(crate) fn setting_not_found(key: &str) -> Self {
        Error::NotFound(format!("Problem finding setting: {}", key))
    }
}
