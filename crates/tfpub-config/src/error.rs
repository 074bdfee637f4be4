//! Input resolution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("inputs {0} and {1} are mutually exclusive")]
    Conflict(String, String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
