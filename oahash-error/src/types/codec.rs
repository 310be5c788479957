use std::{any::Any, io};

use crate::{ErrorExt, StatusCode, TableError};

/// Ошибка текстового/бинарного кодека и файлов дампа с контекстом для
/// диагностики.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Поток закончился посреди записи
    UnexpectedEof {
        context: String,
        offset: Option<u64>,
    },

    /// Повреждённые данные (например, отрицательный счётчик записей)
    CorruptedData {
        reason: String,
        offset: Option<u64>,
    },

    /// Тег поля не совпадает с ожидаемым типом
    InvalidTag {
        tag: u8,
        expected: u8,
        offset: Option<u64>,
    },

    /// Превышен лимит размера
    SizeLimit {
        what: String,
        size: u64,
        limit: u64,
        offset: Option<u64>,
    },

    /// Строковое поле не является корректным UTF-8
    InvalidUtf8 { offset: Option<u64> },

    /// Строка текстового формата без разделителя `:`
    MalformedLine { line: usize, content: String },

    /// Пользовательский парсер ключа или значения вернул ошибку
    Parse {
        line: usize,
        field: &'static str,
        reason: String,
    },

    /// Неверный magic number в заголовке дампа
    InvalidMagic { expected: [u8; 3], got: [u8; 3] },

    /// Неподдерживаемая версия формата дампа
    UnsupportedVersion { found: u8, supported: Vec<u8> },

    /// CRC не совпадает
    CrcMismatch { computed: u32, recorded: u32 },

    /// Файл дампа короче минимального заголовка
    FileTooSmall { size: u64, minimum: u64 },

    /// Прочие ошибки ввода-вывода
    Io {
        kind: io::ErrorKind,
        message: String,
    },

    /// Ошибка таблицы при применении прочитанных записей
    Table(TableError),
}

impl CodecError {
    /// Добавляет контекст offset к ошибке.
    pub fn with_offset(
        mut self,
        offset: u64,
    ) -> Self {
        match &mut self {
            Self::UnexpectedEof { offset: o, .. }
            | Self::CorruptedData { offset: o, .. }
            | Self::InvalidTag { offset: o, .. }
            | Self::SizeLimit { offset: o, .. }
            | Self::InvalidUtf8 { offset: o } => {
                // Сохраняем самый ранний (внутренний) offset.
                if o.is_none() {
                    *o = Some(offset);
                }
            }
            _ => {}
        }
        self
    }

    /// Возвращает recovery hint для пользователя.
    pub fn recovery_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnexpectedEof { .. } => Some("Stream may be truncated. Check the source"),
            Self::CrcMismatch { .. } | Self::CorruptedData { .. } => {
                Some("Dump may be corrupted. Try restoring from a backup")
            }
            Self::UnsupportedVersion { .. } => {
                Some("Dump was written by a newer version of the library")
            }
            Self::SizeLimit { .. } => Some("Increase max_field_len in the table configuration"),
            Self::MalformedLine { .. } | Self::Parse { .. } => {
                Some("Use MalformedLinePolicy::Skip to ignore unparseable lines")
            }
            _ => None,
        }
    }

    /// Является ли ошибка потенциально восстановимой.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedLine { .. } | Self::Parse { .. } | Self::Table(_)
        )
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof { context, offset } => {
                write!(f, "Unexpected EOF: {context}")?;
                write_offset(f, *offset)
            }
            Self::CorruptedData { reason, offset } => {
                write!(f, "Corrupted data: {reason}")?;
                write_offset(f, *offset)
            }
            Self::InvalidTag {
                tag,
                expected,
                offset,
            } => {
                write!(f, "Invalid tag 0x{tag:02X} (expected 0x{expected:02X})")?;
                write_offset(f, *offset)
            }
            Self::SizeLimit {
                what,
                size,
                limit,
                offset,
            } => {
                write!(f, "{what} size {size} exceeds limit {limit} bytes")?;
                write_offset(f, *offset)
            }
            Self::InvalidUtf8 { offset } => {
                write!(f, "Invalid UTF-8 in string field")?;
                write_offset(f, *offset)
            }
            Self::MalformedLine { line, content } => {
                write!(f, "Malformed line {line}: missing ':' separator in {content:?}")
            }
            Self::Parse {
                line,
                field,
                reason,
            } => write!(f, "Failed to parse {field} on line {line}: {reason}"),
            Self::InvalidMagic { expected, got } => {
                write!(
                    f,
                    "Invalid magic number: expected {expected:?}, got {got:?}",
                )
            }
            Self::UnsupportedVersion { found, supported } => {
                write!(f, "Unsupported version {found} (supported: {supported:?})")
            }
            Self::CrcMismatch { computed, recorded } => {
                write!(
                    f,
                    "CRC mismatch: computed 0x{computed:08X}, recorded 0x{recorded:08X}",
                )
            }
            Self::FileTooSmall { size, minimum } => {
                write!(f, "File too small: {size} bytes (minimum: {minimum} bytes)")
            }
            Self::Io { kind, message } => write!(f, "I/O error ({kind:?}): {message}"),
            Self::Table(e) => write!(f, "{e}"),
        }
    }
}

/// Вспомогательная функция для форматирования offset.
fn write_offset(
    f: &mut std::fmt::Formatter<'_>,
    offset: Option<u64>,
) -> std::fmt::Result {
    if let Some(o) = offset {
        write!(f, " [offset: 0x{o:X}]")?;
    }
    Ok(())
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl ErrorExt for CodecError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnexpectedEof { .. } => StatusCode::UnexpectedEof,
            Self::CorruptedData { .. } | Self::CrcMismatch { .. } => StatusCode::CorruptedData,
            Self::InvalidTag { .. } | Self::InvalidMagic { .. } | Self::FileTooSmall { .. } => {
                StatusCode::InvalidData
            }
            Self::SizeLimit { .. } => StatusCode::SizeLimit,
            Self::InvalidUtf8 { .. } => StatusCode::InvalidUtf8,
            Self::MalformedLine { .. } | Self::Parse { .. } => StatusCode::ParseError,
            Self::UnsupportedVersion { .. } => StatusCode::UnsupportedVersion,
            Self::Io { kind, .. } => match kind {
                io::ErrorKind::NotFound => StatusCode::NotFound,
                io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
                _ => StatusCode::Io,
            },
            Self::Table(e) => e.status_code(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn log_message(&self) -> String {
        let mut msg = format!("{self:?}");
        if let Some(hint) = self.recovery_hint() {
            msg.push_str(&format!(" | Hint: {hint}"));
        }
        msg
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
            ("recoverable", self.is_recoverable().to_string()),
        ];

        match self {
            Self::InvalidTag { tag, .. } => {
                tags.push(("invalid_tag", format!("0x{tag:02X}")));
            }
            Self::UnsupportedVersion { found, .. } => {
                tags.push(("version", found.to_string()));
            }
            Self::SizeLimit { what, .. } => {
                tags.push(("limit_type", what.clone()));
            }
            _ => {}
        }

        tags
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => CodecError::UnexpectedEof {
                context: e.to_string(),
                offset: None,
            },
            kind => CodecError::Io {
                kind,
                message: e.to_string(),
            },
        }
    }
}

impl From<TableError> for CodecError {
    fn from(e: TableError) -> Self {
        CodecError::Table(e)
    }
}

// Конверсия в std::io::Error для кода, работающего только с io::Result
impl From<CodecError> for io::Error {
    fn from(e: CodecError) -> Self {
        let kind = match &e {
            CodecError::UnexpectedEof { .. } => io::ErrorKind::UnexpectedEof,
            CodecError::Io { kind, .. } => *kind,
            CodecError::UnsupportedVersion { .. } => io::ErrorKind::Unsupported,
            CodecError::SizeLimit { .. } => io::ErrorKind::InvalidInput,
            CodecError::Table(_) => io::ErrorKind::Other,
            _ => io::ErrorKind::InvalidData,
        };

        io::Error::new(kind, e.to_string())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
