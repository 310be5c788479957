use std::{
    fmt::Display,
    io::{self, BufRead, Write},
};

use oahash_error::CodecError;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{apply_records, DecodeSummary};
use crate::{
    config::TableConfig,
    database::{KeyHasher, OaTable},
};

/// Что делать со строкой текстового формата, которую не удалось разобрать
/// (нет `:` или парсер ключа/значения вернул ошибку).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Пропустить строку и продолжить
    #[default]
    Skip,
    /// Прервать чтение с ошибкой
    Reject,
}

/// Записывает каждую занятую ячейку строкой `"<key>:<value>\n"` в порядке
/// индексов. Возвращает число записанных строк.
///
/// Формат не экранирует разделители: ключ, содержащий `:`, или значение с
/// переводом строки прочитаются обратно иначе.
pub fn write_text<K, V, H, W>(
    table: &OaTable<K, V, H>,
    mut w: W,
) -> Result<usize, CodecError>
where
    K: Display,
    V: Display,
    W: Write,
{
    let mut count = 0;
    for (key, value) in table {
        writeln!(w, "{key}:{value}")?;
        count += 1;
    }
    w.flush()?;
    Ok(count)
}

/// Читает строки `"<key>:<value>"` и вставляет пары в таблицу, пропуская
/// неразборчивые строки.
pub fn read_text<K, V, H, R, PK, PV, E>(
    table: &mut OaTable<K, V, H>,
    reader: R,
    parse_key: PK,
    parse_value: PV,
) -> Result<DecodeSummary, CodecError>
where
    K: Eq,
    H: KeyHasher<K>,
    R: BufRead,
    PK: FnMut(&str) -> Result<K, E>,
    PV: FnMut(&str) -> Result<V, E>,
    E: Display,
{
    read_text_with_policy(
        table,
        reader,
        MalformedLinePolicy::Skip,
        parse_key,
        parse_value,
    )
}

/// Читает строки `"<key>:<value>"` с политикой из секции `[table]`
/// (`malformed_lines`).
pub fn read_text_with_config<K, V, H, R, PK, PV, E>(
    table: &mut OaTable<K, V, H>,
    reader: R,
    config: &TableConfig,
    parse_key: PK,
    parse_value: PV,
) -> Result<DecodeSummary, CodecError>
where
    K: Eq,
    H: KeyHasher<K>,
    R: BufRead,
    PK: FnMut(&str) -> Result<K, E>,
    PV: FnMut(&str) -> Result<V, E>,
    E: Display,
{
    read_text_with_policy(
        table,
        reader,
        config.malformed_lines,
        parse_key,
        parse_value,
    )
}

/// Читает строки `"<key>:<value>"` с заданной политикой для неразборчивых
/// строк.
///
/// Строка делится по первому `:`, так что значение может содержать
/// двоеточия. Пустые строки пропускаются всегда. Все строки читаются до
/// первой вставки, поэтому ошибка чтения или разбора не меняет таблицу.
pub fn read_text_with_policy<K, V, H, R, PK, PV, E>(
    table: &mut OaTable<K, V, H>,
    reader: R,
    policy: MalformedLinePolicy,
    mut parse_key: PK,
    mut parse_value: PV,
) -> Result<DecodeSummary, CodecError>
where
    K: Eq,
    H: KeyHasher<K>,
    R: BufRead,
    PK: FnMut(&str) -> Result<K, E>,
    PV: FnMut(&str) -> Result<V, E>,
    E: Display,
{
    let mut records = Vec::new();
    let mut skipped = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => CodecError::InvalidUtf8 { offset: None },
            _ => CodecError::from(e),
        })?;

        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once(':') else {
            match policy {
                MalformedLinePolicy::Skip => {
                    trace!(line = line_no, "skipping line without ':' separator");
                    skipped += 1;
                    continue;
                }
                MalformedLinePolicy::Reject => {
                    return Err(CodecError::MalformedLine {
                        line: line_no,
                        content: line.clone(),
                    });
                }
            }
        };

        let parsed = parse_key(raw_key)
            .map_err(|e| ("key", e.to_string()))
            .and_then(|k| {
                parse_value(raw_value)
                    .map(|v| (k, v))
                    .map_err(|e| ("value", e.to_string()))
            });

        match parsed {
            Ok(pair) => records.push(pair),
            Err((field, reason)) => match policy {
                MalformedLinePolicy::Skip => {
                    trace!(line = line_no, field, %reason, "skipping unparseable line");
                    skipped += 1;
                }
                MalformedLinePolicy::Reject => {
                    return Err(CodecError::Parse {
                        line: line_no,
                        field,
                        reason,
                    });
                }
            },
        }
    }

    if skipped > 0 {
        debug!(skipped, "text decode skipped malformed lines");
    }

    apply_records(table, records, skipped)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
