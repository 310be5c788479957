use std::any::Any;

use oahash_error::{ErrorExt, StatusCode, TableError};
use thiserror::Error;

/// Ошибки загрузки и проверки конфигурации, а также инициализации
/// логирования.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid table configuration: {0}")]
    Table(#[from] TableError),

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl ErrorExt for SettingsError {
    fn status_code(&self) -> StatusCode {
        match self {
            SettingsError::Load(_) | SettingsError::InvalidValue { .. } => StatusCode::InvalidArgs,
            SettingsError::Table(e) => e.status_code(),
            SettingsError::Logging(_) => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
