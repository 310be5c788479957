use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    database::{ProbeStep, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR},
    engine::{MalformedLinePolicy, DEFAULT_MAX_FIELD_LEN},
    error::{SettingsError, TableError},
    logging::LoggingConfig,
};

/// Параметры создаваемых таблиц и их кодеков (секция `[table]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub load_factor: f64,
    pub probe_step: ProbeStep,
    /// Доля tombstone'ов, при которой таблица компактируется. `None`
    /// отключает компакцию.
    pub compaction_ratio: Option<f64>,
    pub malformed_lines: MalformedLinePolicy,
    pub max_field_len: u32,
}

/// Полная конфигурация: секции `[table]` и `[logging]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub table: TableConfig,
    pub logging: LoggingConfig,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl TableConfig {
    /// Проверяет значения до создания таблицы.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.initial_capacity == 0 {
            return Err(TableError::InvalidCapacity {
                capacity: self.initial_capacity,
            }
            .into());
        }
        if !(self.load_factor > 0.0 && self.load_factor < 1.0) {
            return Err(TableError::InvalidLoadFactor {
                load_factor: self.load_factor,
            }
            .into());
        }
        if let Some(ratio) = self.compaction_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(TableError::InvalidCompactionRatio { ratio }.into());
            }
        }
        if self.max_field_len == 0 {
            return Err(SettingsError::InvalidValue {
                field: "table.max_field_len",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Settings {
    /// Загружает настройки из значений по умолчанию и переменных окружения
    /// `OAHASH_*`.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(None)
    }

    /// Загружает настройки, накладывая слои по порядку: значения по
    /// умолчанию, TOML-файл (если указан), переменные окружения.
    ///
    /// Переменные окружения: `OAHASH_TABLE__LOAD_FACTOR=0.75`,
    /// `OAHASH_LOGGING__FORMAT=json`,
    /// `OAHASH_LOGGING__DIRECTIVES=oahash::database=trace,oahash::engine=debug`.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            // Значения по умолчанию
            .set_default("table.initial_capacity", DEFAULT_CAPACITY as u64)?
            .set_default("table.load_factor", DEFAULT_LOAD_FACTOR)?
            .set_default("table.probe_step", ProbeStep::default().as_str())?
            .set_default("logging.level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        // Переменные окружения с префиксом OAHASH_
        let cfg = builder
            .add_source(
                Environment::with_prefix("OAHASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("logging.directives"),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.table.validate()?;
        self.logging.validate()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для TableConfig
////////////////////////////////////////////////////////////////////////////////

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            probe_step: ProbeStep::default(),
            compaction_ratio: None,
            malformed_lines: MalformedLinePolicy::default(),
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
