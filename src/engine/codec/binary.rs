use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use oahash_error::CodecError;

use super::{apply_records, BinaryField, DecodeSummary, OffsetReader, DEFAULT_MAX_FIELD_LEN};
use crate::{
    config::TableConfig,
    database::{KeyHasher, OaTable},
};

/// Верхняя граница предварительного резервирования под записи: счётчик
/// берётся из потока и не заслуживает доверия.
const PREALLOC_LIMIT: usize = 4096;

/// Записывает таблицу в бинарном формате: `i32` BE число записей, затем
/// для каждой занятой ячейки поле ключа и поле значения.
///
/// Возвращает число записанных пар.
pub fn write_binary<K, V, H, W>(
    table: &OaTable<K, V, H>,
    mut w: W,
) -> Result<usize, CodecError>
where
    K: BinaryField,
    V: BinaryField,
    W: Write,
{
    let count = i32::try_from(table.len()).map_err(|_| CodecError::SizeLimit {
        what: "record count".to_string(),
        size: table.len() as u64,
        limit: i32::MAX as u64,
        offset: None,
    })?;

    w.write_i32::<BigEndian>(count)?;
    for (key, value) in table {
        key.write_field(&mut w)?;
        value.write_field(&mut w)?;
    }
    w.flush()?;

    Ok(table.len())
}

/// Читает записи бинарного формата и вставляет их в таблицу.
pub fn read_binary<K, V, H, R>(
    table: &mut OaTable<K, V, H>,
    reader: R,
) -> Result<DecodeSummary, CodecError>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    R: Read,
{
    read_binary_with_limit(table, reader, DEFAULT_MAX_FIELD_LEN)
}

/// То же, что [`read_binary`], с лимитом длины поля из секции `[table]`
/// (`max_field_len`).
pub fn read_binary_with_config<K, V, H, R>(
    table: &mut OaTable<K, V, H>,
    reader: R,
    config: &TableConfig,
) -> Result<DecodeSummary, CodecError>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    R: Read,
{
    read_binary_with_limit(table, reader, config.max_field_len)
}

/// То же, что [`read_binary`], с явным лимитом длины строкового поля.
///
/// Все записи читаются до первой вставки: при ошибке формата таблица не
/// меняется. Ошибки содержат offset поля относительно начала потока.
pub fn read_binary_with_limit<K, V, H, R>(
    table: &mut OaTable<K, V, H>,
    reader: R,
    max_field_len: u32,
) -> Result<DecodeSummary, CodecError>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    R: Read,
{
    let mut reader = OffsetReader::new(reader);
    let records = decode_records(&mut reader, max_field_len)?;
    apply_records(table, records, 0)
}

/// Читает счётчик и ровно столько записей.
pub(crate) fn decode_records<K, V, R>(
    reader: &mut OffsetReader<R>,
    max_field_len: u32,
) -> Result<Vec<(K, V)>, CodecError>
where
    K: BinaryField,
    V: BinaryField,
    R: Read,
{
    let count_at = reader.position();
    let count = reader
        .read_i32::<BigEndian>()
        .map_err(|e| CodecError::from(e).with_offset(count_at))?;
    if count < 0 {
        return Err(CodecError::CorruptedData {
            reason: format!("negative record count {count}"),
            offset: Some(count_at),
        });
    }

    let count = count as usize;
    let mut records = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for _ in 0..count {
        let key_at = reader.position();
        let key = K::read_field(reader, max_field_len).map_err(|e| e.with_offset(key_at))?;

        let value_at = reader.position();
        let value = V::read_field(reader, max_field_len).map_err(|e| e.with_offset(value_at))?;

        records.push((key, value));
    }

    Ok(records)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
