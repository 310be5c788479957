use std::{
    fmt::{self, Display, Write as _},
    hash::{Hash, Hasher},
};

use rustc_hash::FxHasher;
use siphasher::sip::SipHasher13;
use xxhash_rust::xxh64::Xxh64;

/// Первичная хеш-функция ключа.
///
/// Реализации обязаны быть детерминированными: один и тот же ключ даёт
/// один и тот же хеш в любом процессе, иначе раскладка ячеек после
/// загрузки дампа перестанет воспроизводиться.
pub trait KeyHasher<K: ?Sized>: Default + Clone {
    fn hash_key(
        &self,
        key: &K,
    ) -> u64;

    fn name(&self) -> &'static str;
}

/// Полиномиальный хеш по основанию 31 над текстовым (`Display`)
/// представлением ключа.
///
/// Накопление идёт в `i64` с переполнением по модулю 2^64, результат
/// берётся по модулю (никогда не отрицательный).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolyHasher;

/// SipHash-1-3 с фиксированными ключами.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SipKeyHasher {
    key0: u64,
    key1: u64,
}

/// xxh64 с фиксированным seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XxKeyHasher {
    seed: u64,
}

/// FxHash из `rustc-hash`: быстрый, без криптостойкости.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FxKeyHasher;

/// Аккумулятор полиномиального хеша, принимающий вывод `fmt`.
struct PolyAccumulator {
    state: i64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl PolyHasher {
    /// Хеширует готовую строку тем же алгоритмом, что и `hash_key`.
    pub fn hash_str(s: &str) -> u64 {
        let mut acc = PolyAccumulator { state: 0 };
        acc.feed(s.as_bytes());
        acc.state.unsigned_abs()
    }
}

impl SipKeyHasher {
    pub fn new(
        key0: u64,
        key1: u64,
    ) -> Self {
        Self { key0, key1 }
    }

    pub fn with_default_key() -> Self {
        Self::new(0, 0)
    }
}

impl XxKeyHasher {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn with_default_seed() -> Self {
        Self::new(0)
    }
}

impl PolyAccumulator {
    #[inline]
    fn feed(
        &mut self,
        bytes: &[u8],
    ) {
        for &b in bytes {
            self.state = self.state.wrapping_mul(31).wrapping_add(b as i64);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для хешеров
////////////////////////////////////////////////////////////////////////////////

impl fmt::Write for PolyAccumulator {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        self.feed(s.as_bytes());
        Ok(())
    }
}

impl Default for SipKeyHasher {
    fn default() -> Self {
        Self::with_default_key()
    }
}

impl Default for XxKeyHasher {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

impl<K: Display + ?Sized> KeyHasher<K> for PolyHasher {
    fn hash_key(
        &self,
        key: &K,
    ) -> u64 {
        let mut acc = PolyAccumulator { state: 0 };
        // Запись в аккумулятор не может завершиться ошибкой.
        let _ = write!(acc, "{key}");
        acc.state.unsigned_abs()
    }

    fn name(&self) -> &'static str {
        "PolyHash31"
    }
}

impl<K: Hash + ?Sized> KeyHasher<K> for SipKeyHasher {
    fn hash_key(
        &self,
        key: &K,
    ) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(self.key0, self.key1);
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "SipHash"
    }
}

impl<K: Hash + ?Sized> KeyHasher<K> for XxKeyHasher {
    fn hash_key(
        &self,
        key: &K,
    ) -> u64 {
        let mut hasher = Xxh64::new(self.seed);
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "XxHash64"
    }
}

impl<K: Hash + ?Sized> KeyHasher<K> for FxKeyHasher {
    fn hash_key(
        &self,
        key: &K,
    ) -> u64 {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "FxHash"
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
