//! Текстовая и бинарная сериализация таблицы `OaTable`.
//!
//! ## Форматы
//!
//! - текст: одна строка `"<key>:<value>"` на пару, в порядке ячеек;
//! - бинарный: `[i32 BE count][record]*`, запись - поле ключа и поле
//!   значения, каждое с тегом типа (см. [`tags`]).
//!
//! Оба формата не зависят от ёмкости таблицы. Декодирование поэтапное:
//! сначала читаются все записи, затем они вставляются, поэтому ошибка
//! чтения или формата оставляет таблицу нетронутой.
//!
//! ```no_run
//! use oahash::{engine::codec::{read_binary, write_binary}, OaTable};
//!
//! let mut table: OaTable<String, i64> = OaTable::default();
//! table.insert("a".to_string(), 1)?;
//!
//! let mut buf = Vec::new();
//! write_binary(&table, &mut buf)?;
//!
//! let mut copy: OaTable<String, i64> = OaTable::new(2, 0.5)?;
//! read_binary(&mut copy, &buf[..])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Модули
//!
//! - [`text`] - построчный формат `key:value`
//! - [`binary`] - бинарный формат с тегами полей
//! - [`field`] - трейт `BinaryField` и его реализации
//! - [`tags`] - константы тегов типов
//! - [`tracking`] - обёртки для подсчёта offset и CRC32

pub mod binary;
pub mod field;
pub mod tags;
pub mod text;
pub mod tracking;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use binary::*;
pub use field::*;
pub use tags::*;
pub use text::*;
pub use tracking::*;

use oahash_error::CodecError;

use crate::database::{KeyHasher, OaTable};

/// Итог декодирования.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Сколько записей прочитано и применено
    pub records: usize,
    /// Сколько из них оказались новыми ключами
    pub added: usize,
    /// Сколько строк пропущено (только текстовый формат)
    pub skipped: usize,
}

/// Вставляет прочитанные записи в таблицу.
///
/// Единственная ошибка на этом этапе - `TableFull`, возможная только при
/// `ProbeStep::Reference`; записи до неё уже вставлены.
pub(crate) fn apply_records<K, V, H>(
    table: &mut OaTable<K, V, H>,
    records: Vec<(K, V)>,
    skipped: usize,
) -> Result<DecodeSummary, CodecError>
where
    K: Eq,
    H: KeyHasher<K>,
{
    let total = records.len();
    let added = table.try_extend(records)?;
    Ok(DecodeSummary {
        records: total,
        added,
        skipped,
    })
}
