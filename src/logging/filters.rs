use tracing_subscriber::EnvFilter;

use crate::{error::SettingsError, logging::config::LoggingConfig};

/// Собирает фильтр: `RUST_LOG`, если переменная задана, иначе директива
/// из конфигурации.
pub fn build_filter_from_config(config: &LoggingConfig) -> Result<EnvFilter, SettingsError> {
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        return Ok(env_filter);
    }

    let directive = config.build_filter_directive();
    EnvFilter::try_new(&directive).map_err(|e| SettingsError::InvalidValue {
        field: "logging.directives",
        reason: format!("{directive:?}: {e}"),
    })
}
