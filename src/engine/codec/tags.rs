//! Определение тегов для бинарного формата полей записи.
//!
//! Каждое поле (ключ или значение) предваряется однобайтовым тегом типа.
//! Используется в модуле `field`.

/// UTF-8 строка (`String`), длина `u32` BE + байты
pub const TAG_STR: u8 = 0x01;
/// Целое со знаком (i64)
pub const TAG_I64: u8 = 0x02;
/// Число с плавающей точкой (f64)
pub const TAG_F64: u8 = 0x03;
/// Логическое значение (bool)
pub const TAG_BOOL: u8 = 0x0B;
/// Произвольные байты (`Vec<u8>`), длина `u32` BE + байты
pub const TAG_BYTES: u8 = 0x10;
/// Целое со знаком (i32)
pub const TAG_I32: u8 = 0x11;
/// Беззнаковое целое (u32)
pub const TAG_U32: u8 = 0x12;
/// Беззнаковое целое (u64)
pub const TAG_U64: u8 = 0x13;
