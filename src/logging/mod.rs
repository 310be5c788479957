//! Логирование на основе `tracing-subscriber`.
//!
//! Библиотека только порождает события `tracing`; подписчик
//! устанавливает приложение. [`init_logging`] собирает стандартный:
//! `EnvFilter` (сначала `RUST_LOG`, затем конфигурация) и fmt-слой в
//! формате `pretty`, `compact` или `json`.

pub mod config;
mod filters;
mod formatter;

pub use self::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::SettingsError;

/// Устанавливает глобальный подписчик по конфигурации.
///
/// Повторный вызов возвращает `SettingsError::Logging`: глобальный
/// подписчик уже установлен.
pub fn init_logging(config: &LoggingConfig) -> Result<(), SettingsError> {
    config.validate()?;

    let env_filter = filters::build_filter_from_config(config)?;
    let fmt_layer = formatter::build_formatter(config, std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| SettingsError::Logging(e.to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = ?config.format,
        "Logging system initialized"
    );

    Ok(())
}
