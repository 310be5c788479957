//! Хеш-таблица с открытой адресацией: двойное хеширование, удаление через
//! tombstone'ы, рост удвоением и сохранение в текстовом и бинарном
//! форматах.
//!
//! ```
//! use oahash::OaTable;
//!
//! let mut table = OaTable::new(2, 0.5)?;
//! table.insert("A".to_string(), 1)?;
//! table.insert("B".to_string(), 2)?; // рост до ёмкости 4
//! assert_eq!(table.capacity(), 4);
//!
//! assert!(table.remove("A"));
//! assert_eq!(table.get("A"), None);
//! table.insert("A".to_string(), 100)?;
//! assert_eq!(table.get("A"), Some(&100));
//! # Ok::<(), oahash::TableError>(())
//! ```

/// Table configuration loading (defaults, TOML file, environment).
pub mod config;
/// The open-addressing table, key hashers and probe sequences.
pub mod database;
/// Text and binary codecs, dump files.
pub mod engine;
/// Settings errors and re-exported table/codec errors.
pub mod error;
/// tracing-subscriber setup.
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use crate::config::{Settings, TableConfig};
/// Table, hashers, probe steps, diagnostics.
pub use crate::database::{
    FxKeyHasher, KeyHasher, OaTable, PolyHasher, ProbeStep, SipKeyHasher, Slot, TableStats,
    ValidationError, XxKeyHasher,
};
/// Codecs and dump files.
pub use crate::engine::{
    load_from_file, load_from_file_with_config, read_binary, read_binary_with_config, read_dump,
    read_text, read_text_with_config, read_text_with_policy, save_to_file, write_binary,
    write_dump, write_text, BinaryField, DecodeSummary, MalformedLinePolicy,
};
/// Errors and result types.
pub use crate::error::{CodecError, OaResult, SettingsError, StackError, StatusCode, TableError};
/// Logging.
pub use crate::logging::{init_logging, LogFormat, LoggingConfig};
