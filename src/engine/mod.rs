//! Сохранение и загрузка таблицы.
//!
//! - [`codec`] - текстовый и бинарный форматы поверх произвольных
//!   `Read`/`Write`;
//! - [`dump`] - файлы дампа с magic, версией и CRC32.

pub mod codec;
pub mod dump;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use codec::*;
pub use dump::*;
