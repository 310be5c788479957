use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::SettingsError;

/// Формат вывода событий.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный, для разработки
    Pretty,
    /// Однострочный
    #[default]
    Compact,
    /// JSON, по объекту на событие
    Json,
}

/// Настройки логирования (секция `[logging]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Базовый уровень: `trace`, `debug`, `info`, `warn`, `error`, `off`
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_line_numbers: bool,
    /// Дополнительные директивы `EnvFilter`, например
    /// `oahash::database=trace`
    pub directives: Vec<String>,
}

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl LoggingConfig {
    /// Собирает строку директив для `EnvFilter`: уровень, затем
    /// дополнительные директивы через запятую.
    pub fn build_filter_directive(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.directives.len());
        parts.push(self.level.to_lowercase());
        parts.extend(
            self.directives
                .iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        );
        parts.join(",")
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let level = self.level.to_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(SettingsError::InvalidValue {
                field: "logging.level",
                reason: format!("unknown level {:?}, expected one of {LEVELS:?}", self.level),
            });
        }

        EnvFilter::try_new(self.build_filter_directive()).map_err(|e| {
            SettingsError::InvalidValue {
                field: "logging.directives",
                reason: e.to_string(),
            }
        })?;

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
            with_line_numbers: false,
            directives: Vec::new(),
        }
    }
}
