use std::io::{self, Read, Write};

/// Reader-обёртка, считающая абсолютную позицию в потоке.
///
/// Позиция используется для указания offset в ошибках декодирования.
pub struct OffsetReader<R: Read> {
    inner: R,
    position: u64,
}

/// Writer-обёртка для вычисления CRC32 на лету.
///
/// Обновляет hasher при каждой записи, не требуя буферизации всего дампа.
pub struct Crc32Write<W: Write> {
    inner: W,
    hasher: crc32fast::Hasher,
    bytes_written: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<R: Read> OffsetReader<R> {
    pub fn new(inner: R) -> Self {
        Self::starting_at(inner, 0)
    }

    /// Создаёт reader, у которого первый байт `inner` имеет позицию `base`.
    pub fn starting_at(
        inner: R,
        base: u64,
    ) -> Self {
        Self {
            inner,
            position: base,
        }
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<W: Write> Crc32Write<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: crc32fast::Hasher::new(),
            bytes_written: 0,
        }
    }

    /// Возвращает (inner, crc) - потребляет self.
    pub fn into_inner_and_finalize(self) -> (W, u32) {
        let crc = self.hasher.finalize();
        (self.inner, crc)
    }

    /// Сколько байт прошло через обёртку (и вошло в CRC).
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для OffsetReader, Crc32Write
////////////////////////////////////////////////////////////////////////////////

impl<R: Read> Read for OffsetReader<R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<W: Write> Write for Crc32Write<W> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes_written += n as u64;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
