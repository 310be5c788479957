use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use oahash_error::CodecError;

use super::tags::{TAG_BOOL, TAG_BYTES, TAG_F64, TAG_I32, TAG_I64, TAG_STR, TAG_U32, TAG_U64};

/// Максимальная длина строкового/байтового поля по умолчанию (512 MiB).
pub const DEFAULT_MAX_FIELD_LEN: u32 = 512 * 1024 * 1024;

/// Тип, который умеет записываться в бинарный формат как одно поле:
/// тег, затем big-endian скаляр или `u32` BE длина и байты.
pub trait BinaryField: Sized {
    /// Тег типа в потоке.
    const TAG: u8;

    /// Записывает данные поля без тега.
    fn write_payload<W: Write>(
        &self,
        w: &mut W,
    ) -> Result<(), CodecError>;

    /// Читает данные поля без тега. Поля переменной длины длиннее
    /// `max_len` отклоняются до выделения памяти.
    fn read_payload<R: Read>(
        r: &mut R,
        max_len: u32,
    ) -> Result<Self, CodecError>;

    /// Записывает тег и данные.
    fn write_field<W: Write>(
        &self,
        w: &mut W,
    ) -> Result<(), CodecError> {
        w.write_u8(Self::TAG)?;
        self.write_payload(w)
    }

    /// Читает тег, сверяет его с `Self::TAG` и читает данные.
    fn read_field<R: Read>(
        r: &mut R,
        max_len: u32,
    ) -> Result<Self, CodecError> {
        let tag = r.read_u8()?;
        if tag != Self::TAG {
            return Err(CodecError::InvalidTag {
                tag,
                expected: Self::TAG,
                offset: None,
            });
        }
        Self::read_payload(r, max_len)
    }
}

/// Скалярные поля фиксированной ширины.
macro_rules! scalar_field {
    ($ty:ty, $tag:expr, $write:ident, $read:ident) => {
        impl BinaryField for $ty {
            const TAG: u8 = $tag;

            fn write_payload<W: Write>(
                &self,
                w: &mut W,
            ) -> Result<(), CodecError> {
                w.$write::<BigEndian>(*self)?;
                Ok(())
            }

            fn read_payload<R: Read>(
                r: &mut R,
                _max_len: u32,
            ) -> Result<Self, CodecError> {
                Ok(r.$read::<BigEndian>()?)
            }
        }
    };
}

scalar_field!(i32, TAG_I32, write_i32, read_i32);
scalar_field!(i64, TAG_I64, write_i64, read_i64);
scalar_field!(u32, TAG_U32, write_u32, read_u32);
scalar_field!(u64, TAG_U64, write_u64, read_u64);
scalar_field!(f64, TAG_F64, write_f64, read_f64);

impl BinaryField for bool {
    const TAG: u8 = TAG_BOOL;

    fn write_payload<W: Write>(
        &self,
        w: &mut W,
    ) -> Result<(), CodecError> {
        w.write_u8(u8::from(*self))?;
        Ok(())
    }

    fn read_payload<R: Read>(
        r: &mut R,
        _max_len: u32,
    ) -> Result<Self, CodecError> {
        match r.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::CorruptedData {
                reason: format!("invalid bool byte 0x{other:02X}"),
                offset: None,
            }),
        }
    }
}

impl BinaryField for Vec<u8> {
    const TAG: u8 = TAG_BYTES;

    fn write_payload<W: Write>(
        &self,
        w: &mut W,
    ) -> Result<(), CodecError> {
        write_len_prefixed(w, self)
    }

    fn read_payload<R: Read>(
        r: &mut R,
        max_len: u32,
    ) -> Result<Self, CodecError> {
        read_len_prefixed(r, max_len)
    }
}

impl BinaryField for String {
    const TAG: u8 = TAG_STR;

    fn write_payload<W: Write>(
        &self,
        w: &mut W,
    ) -> Result<(), CodecError> {
        write_len_prefixed(w, self.as_bytes())
    }

    fn read_payload<R: Read>(
        r: &mut R,
        max_len: u32,
    ) -> Result<Self, CodecError> {
        let bytes = read_len_prefixed(r, max_len)?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { offset: None })
    }
}

fn write_len_prefixed<W: Write>(
    w: &mut W,
    bytes: &[u8],
) -> Result<(), CodecError> {
    let len = u32::try_from(bytes.len()).map_err(|_| CodecError::SizeLimit {
        what: "field".to_string(),
        size: bytes.len() as u64,
        limit: u32::MAX as u64,
        offset: None,
    })?;
    w.write_u32::<BigEndian>(len)?;
    w.write_all(bytes)?;
    Ok(())
}

fn read_len_prefixed<R: Read>(
    r: &mut R,
    max_len: u32,
) -> Result<Vec<u8>, CodecError> {
    let len = r.read_u32::<BigEndian>()?;
    if len > max_len {
        return Err(CodecError::SizeLimit {
            what: "field".to_string(),
            size: len as u64,
            limit: max_len as u64,
            offset: None,
        });
    }

    // Длина из потока не доверенная: читаем через take, а не выделяем
    // буфер заранее.
    let mut buf = Vec::new();
    r.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len as usize {
        return Err(CodecError::UnexpectedEof {
            context: format!("field declares {len} bytes, got {}", buf.len()),
            offset: None,
        });
    }
    Ok(buf)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: BinaryField>(v: &T) -> Vec<u8> {
        let mut buf = Vec::new();
        v.write_field(&mut buf).unwrap();
        buf
    }

    /// Тест проверяет точную раскладку байтов для строки и целых.
    #[test]
    fn test_wire_layout() {
        assert_eq!(
            encode(&"hi".to_string()),
            vec![TAG_STR, 0, 0, 0, 2, b'h', b'i']
        );
        assert_eq!(encode(&1i32), vec![TAG_I32, 0, 0, 0, 1]);
        assert_eq!(
            encode(&-1i64),
            vec![TAG_I64, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(encode(&true), vec![TAG_BOOL, 1]);
    }

    #[test]
    fn test_scalar_values_survive() {
        let mut buf = Vec::new();
        3.5f64.write_field(&mut buf).unwrap();
        u64::MAX.write_field(&mut buf).unwrap();
        false.write_field(&mut buf).unwrap();

        let mut r = &buf[..];
        assert_eq!(f64::read_field(&mut r, 0).unwrap(), 3.5);
        assert_eq!(u64::read_field(&mut r, 0).unwrap(), u64::MAX);
        assert!(!bool::read_field(&mut r, 0).unwrap());
        assert!(r.is_empty());
    }

    #[test]
    fn test_tag_mismatch() {
        let buf = encode(&7u32);
        let err = i64::read_field(&mut &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidTag {
                tag: TAG_U32,
                expected: TAG_I64,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let buf = vec![TAG_STR, 0, 0, 0, 2, 0xC3, 0x28];
        let err = String::read_field(&mut &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { .. }));
    }

    /// Тест проверяет, что слишком длинное поле отклоняется по заголовку.
    #[test]
    fn test_size_limit() {
        let buf = encode(&vec![0u8; 64]);
        let err = Vec::<u8>::read_field(&mut &buf[..], 16).unwrap_err();
        assert!(matches!(
            err,
            CodecError::SizeLimit {
                size: 64,
                limit: 16,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_bytes() {
        let mut buf = encode(&b"abcdef".to_vec());
        buf.truncate(buf.len() - 2);
        let err = Vec::<u8>::read_field(&mut &buf[..], DEFAULT_MAX_FIELD_LEN).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_invalid_bool_byte() {
        let buf = vec![TAG_BOOL, 2];
        let err = bool::read_field(&mut &buf[..], 0).unwrap_err();
        assert!(matches!(err, CodecError::CorruptedData { .. }));
    }
}
