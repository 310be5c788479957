//! Файлы дампа: бинарное тело таблицы в рамке из заголовка и CRC32.
//!
//! ```text
//! +-------+---------+---------------------+-----------+
//! | "OAT" | version | binary body         | CRC32 BE  |
//! | 3 B   | 1 B     | [i32 count][record]*| 4 B       |
//! +-------+---------+---------------------+-----------+
//! ```
//!
//! CRC считается по всем байтам до него. Запись идёт во временный файл в
//! той же директории, который затем атомарно заменяет целевой.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use oahash_error::{CodecError, ErrorExt, LogLevel, OaResult, ResultExt};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use super::codec::{
    apply_records, decode_records, write_binary, BinaryField, Crc32Write, DecodeSummary,
    OffsetReader, DEFAULT_MAX_FIELD_LEN,
};
use crate::{
    config::TableConfig,
    database::{KeyHasher, OaTable},
};

/// «Магическое» начало файла: ASCII-буквы «OAT».
pub const DUMP_MAGIC: &[u8; 3] = b"OAT";

/// Минимальный размер корректного дампа: заголовок, счётчик и CRC.
pub const MIN_DUMP_LEN: u64 = 3 + 1 + 4 + 4;

/// Поддерживаемые версии формата дампа.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V1 = 1,
}

/// Текущая версия формата дампа, как число.
pub const DUMP_VERSION: u8 = FormatVersion::V1 as u8;

/// Смещение бинарного тела внутри дампа.
const BODY_OFFSET: usize = 4;

impl FormatVersion {
    /// Все версии, которые умеет читать библиотека.
    pub fn supported() -> Vec<u8> {
        vec![FormatVersion::V1 as u8]
    }
}

impl TryFrom<u8> for FormatVersion {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FormatVersion::V1),
            found => Err(CodecError::UnsupportedVersion {
                found,
                supported: FormatVersion::supported(),
            }),
        }
    }
}

/// Записывает дамп таблицы в поток. Возвращает число записанных пар.
pub fn write_dump<K, V, H, W>(
    table: &OaTable<K, V, H>,
    w: W,
) -> Result<usize, CodecError>
where
    K: BinaryField,
    V: BinaryField,
    W: Write,
{
    let mut crc_w = Crc32Write::new(w);
    crc_w.write_all(DUMP_MAGIC)?;
    crc_w.write_u8(DUMP_VERSION)?;
    let count = write_binary(table, &mut crc_w)?;
    let framed = crc_w.bytes_written();

    let (mut inner, crc) = crc_w.into_inner_and_finalize();
    inner.write_u32::<BigEndian>(crc)?;
    inner.flush()?;

    debug!(records = count, bytes = framed + 4, crc, "dump written");
    Ok(count)
}

/// Читает дамп из потока и вставляет записи в таблицу.
///
/// Проверяет размер, magic, версию и CRC до разбора тела; при любой ошибке
/// таблица остаётся без изменений.
pub fn read_dump<K, V, H, R>(
    table: &mut OaTable<K, V, H>,
    mut r: R,
    max_field_len: u32,
) -> Result<DecodeSummary, CodecError>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    R: Read,
{
    let mut data = Vec::new();
    r.read_to_end(&mut data)?;
    if (data.len() as u64) < MIN_DUMP_LEN {
        return Err(CodecError::FileTooSmall {
            size: data.len() as u64,
            minimum: MIN_DUMP_LEN,
        });
    }

    let magic = [data[0], data[1], data[2]];
    if &magic != DUMP_MAGIC {
        return Err(CodecError::InvalidMagic {
            expected: *DUMP_MAGIC,
            got: magic,
        });
    }
    FormatVersion::try_from(data[3])?;

    // Отделяем CRC32 (последние 4 байта)
    let (framed, mut crc_bytes) = data.split_at(data.len() - 4);
    let recorded = crc_bytes.read_u32::<BigEndian>()?;
    let computed = crc32fast::hash(framed);
    if computed != recorded {
        return Err(CodecError::CrcMismatch { computed, recorded });
    }

    let mut body = &framed[BODY_OFFSET..];
    let mut reader = OffsetReader::starting_at(&mut body, BODY_OFFSET as u64);
    let records = decode_records::<K, V, _>(&mut reader, max_field_len)?;
    let consumed = reader.position();
    drop(reader);

    if !body.is_empty() {
        return Err(CodecError::CorruptedData {
            reason: format!("{} trailing bytes after last record", body.len()),
            offset: Some(consumed),
        });
    }

    debug!(records = records.len(), crc = computed, "dump verified");
    apply_records(table, records, 0)
}

/// Атомарно сохраняет таблицу в файл дампа.
pub fn save_to_file<K, V, H, P>(
    table: &OaTable<K, V, H>,
    path: P,
) -> OaResult<usize>
where
    K: BinaryField,
    V: BinaryField,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // 1. Временный файл в той же директории, чтобы persist был rename.
    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;

    // 2. Тело дампа.
    let mut writer = BufWriter::new(tmp);
    let count = write_dump(table, &mut writer).context("writing dump")?;
    let tmp = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing dump")?;
    tmp.as_file().sync_all().context("syncing dump")?;

    // 3. Атомарно заменяем старый файл.
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {}", path.display()))?;

    info!(path = %path.display(), records = count, "dump saved");
    Ok(count)
}

/// Загружает пары из файла дампа в таблицу.
pub fn load_from_file<K, V, H, P>(
    table: &mut OaTable<K, V, H>,
    path: P,
) -> OaResult<DecodeSummary>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    P: AsRef<Path>,
{
    load_from_file_with_limit(table, path, DEFAULT_MAX_FIELD_LEN)
}

/// То же, что [`load_from_file`], с лимитом длины поля из секции `[table]`.
pub fn load_from_file_with_config<K, V, H, P>(
    table: &mut OaTable<K, V, H>,
    path: P,
    config: &TableConfig,
) -> OaResult<DecodeSummary>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    P: AsRef<Path>,
{
    load_from_file_with_limit(table, path, config.max_field_len)
}

/// То же, что [`load_from_file`], с явным лимитом длины строкового поля.
pub fn load_from_file_with_limit<K, V, H, P>(
    table: &mut OaTable<K, V, H>,
    path: P,
    max_field_len: u32,
) -> OaResult<DecodeSummary>
where
    K: BinaryField + Eq,
    V: BinaryField,
    H: KeyHasher<K>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let summary = read_dump(table, BufReader::new(file), max_field_len)
        .inspect_err(|err| log_rejected(path, err))
        .with_context(|| format!("loading dump {}", path.display()))?;

    info!(
        path = %path.display(),
        records = summary.records,
        added = summary.added,
        "dump loaded"
    );
    Ok(summary)
}

/// Пишет событие об отвергнутом дампе с уровнем, соответствующим коду
/// ошибки.
fn log_rejected(
    path: &Path,
    err: &CodecError,
) {
    let tags = err.metrics_tags();
    match err.status_code().log_level() {
        LogLevel::Error => error!(path = %path.display(), ?tags, "dump rejected: {err}"),
        LogLevel::Warn => warn!(path = %path.display(), ?tags, "dump rejected: {err}"),
        _ => debug!(path = %path.display(), ?tags, "dump rejected: {err}"),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use oahash_error::StatusCode;

    use super::*;

    fn sample() -> OaTable<String, u64> {
        let mut t = OaTable::new(4, 0.75).unwrap();
        for (i, k) in ["one", "two", "three"].iter().enumerate() {
            t.insert(k.to_string(), i as u64 + 1).unwrap();
        }
        t
    }

    fn dump_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        write_dump(&sample(), &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_header_and_crc() {
        let buf = dump_bytes();
        assert_eq!(&buf[..3], DUMP_MAGIC);
        assert_eq!(buf[3], DUMP_VERSION);

        let (framed, crc) = buf.split_at(buf.len() - 4);
        assert_eq!(crc, crc32fast::hash(framed).to_be_bytes());
    }

    #[test]
    fn test_read_dump_restores_pairs() {
        let buf = dump_bytes();
        let mut t: OaTable<String, u64> = OaTable::default();
        let summary = read_dump(&mut t, &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap();

        assert_eq!(summary.records, 3);
        assert_eq!(t.get("one"), Some(&1));
        assert_eq!(t.get("three"), Some(&3));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut buf = dump_bytes();
        buf[8] ^= 0xFF;

        let mut t: OaTable<String, u64> = OaTable::default();
        let err = read_dump(&mut t, &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(err, CodecError::CrcMismatch { .. }));
        assert!(t.is_empty());
    }

    #[test]
    fn test_bad_magic_and_version() {
        let mut buf = dump_bytes();
        buf[0] = b'X';
        let mut t: OaTable<String, u64> = OaTable::default();
        let err = read_dump(&mut t, &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidMagic { .. }));

        let mut buf = dump_bytes();
        buf[3] = 9;
        let err = read_dump(&mut t, &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnsupportedVersion { found: 9, .. }
        ));
    }

    #[test]
    fn test_too_small() {
        let mut t: OaTable<String, u64> = OaTable::default();
        let err = read_dump(&mut t, &b"OAT\x01"[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert_eq!(err.to_string(), "File too small: 4 bytes (minimum: 12 bytes)");
    }

    /// Тест проверяет, что лишние байты после последней записи (с
    /// корректным CRC) считаются повреждением.
    #[test]
    fn test_trailing_bytes() {
        let mut buf = dump_bytes();
        buf.truncate(buf.len() - 4);
        buf.push(0xAA);
        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_be_bytes());

        let mut t: OaTable<String, u64> = OaTable::default();
        let err = read_dump(&mut t, &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(err, CodecError::CorruptedData { .. }));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let mut t: OaTable<String, u64> = OaTable::default();
        let err = load_from_file(&mut t, "/definitely/not/here.oat").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NotFound);
        assert!(err.to_string().starts_with("opening /definitely/not/here.oat"));
    }
}
