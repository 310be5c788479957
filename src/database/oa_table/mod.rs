//! Хеш-таблица с открытой адресацией и двойным хешированием.
//!
//! # Модули
//!
//! - `oa_table_base`: сама таблица (вставка, поиск, удаление, рехеширование).
//! - `slot`: состояние ячейки (`Empty`, `Occupied`, `Deleted`).
//! - `hasher`: первичные хеш-функции ключа.
//! - `probe`: пробная последовательность двойного хеширования.
//! - `safety`: валидация инвариантов и статистика.

pub mod hasher;
pub mod oa_table_base;
pub mod probe;
pub mod safety;
pub mod slot;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use hasher::*;
pub use oa_table_base::*;
pub use probe::*;
pub use safety::*;
pub use slot::*;
