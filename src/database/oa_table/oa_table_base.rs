use std::{borrow::Borrow, fmt};

use oahash_error::TableError;
use tracing::{debug, trace, warn};

use super::{KeyHasher, PolyHasher, ProbeSeq, ProbeStep, Slot, TableStats, ValidationError};
use crate::{config::TableConfig, validate};

/// Ёмкость таблицы по умолчанию.
pub const DEFAULT_CAPACITY: usize = 16;

/// Порог заполнения по умолчанию.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.9;

/// Хеш-таблица с открытой адресацией и двойным хешированием.
///
/// **ИНВАРИАНТЫ:**
///
/// - `len` равен числу ячеек `Occupied`, `tombstones` равен числу ячеек
///   `Deleted`;
/// - для любого живого ключа его пробная последовательность доходит до его
///   ячейки раньше, чем до любой ячейки `Empty`;
/// - перед вставкой, которая довела бы `len / capacity` до порога или выше,
///   таблица увеличивается вдвое;
/// - ёмкость никогда не уменьшается, рехеширование переносит только занятые
///   ячейки и выбрасывает все tombstone'ы.
///
/// Удаление не сдвигает соседей: ячейка помечается `Deleted` и продолжает
/// участвовать в пробных последовательностях до ближайшего рехеширования
/// или компакции.
#[derive(Debug, Clone)]
pub struct OaTable<K, V, H = PolyHasher> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    tombstones: usize,
    load_factor_threshold: f64,
    probe_step: ProbeStep,
    compaction_ratio: Option<f64>,
    hasher: H,
}

/// Итератор по занятым ячейкам в порядке индексов.
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

/// Результат поиска места для ключа.
enum Placement {
    /// Ключ уже лежит в этой ячейке
    Existing(usize),
    /// Свободная ячейка (первый встреченный tombstone или `Empty`)
    Vacant(usize),
    /// Пробная последовательность исчерпана
    Full,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<K, V> OaTable<K, V, PolyHasher> {
    /// Создаёт таблицу с полиномиальным хешем.
    ///
    /// `initial_capacity` должна быть не меньше 1, `load_factor` лежать в
    /// интервале (0, 1).
    pub fn new(
        initial_capacity: usize,
        load_factor: f64,
    ) -> Result<Self, TableError> {
        Self::with_hasher(initial_capacity, load_factor, PolyHasher)
    }
}

impl<K, V, H> OaTable<K, V, H> {
    /// Создаёт таблицу с заданной хеш-функцией.
    pub fn with_hasher(
        initial_capacity: usize,
        load_factor: f64,
        hasher: H,
    ) -> Result<Self, TableError> {
        if initial_capacity == 0 {
            return Err(TableError::InvalidCapacity {
                capacity: initial_capacity,
            });
        }
        // NaN не проходит ни одно из сравнений.
        if !(load_factor > 0.0 && load_factor < 1.0) {
            return Err(TableError::InvalidLoadFactor { load_factor });
        }

        Ok(Self::build(initial_capacity, load_factor, hasher))
    }

    /// Включает компакцию: когда доля tombstone'ов достигает `ratio`, а
    /// рост не нужен, таблица перестраивается в той же ёмкости.
    pub fn with_compaction_ratio(
        mut self,
        ratio: Option<f64>,
    ) -> Result<Self, TableError> {
        if let Some(r) = ratio {
            if !(r > 0.0 && r <= 1.0) {
                return Err(TableError::InvalidCompactionRatio { ratio: r });
            }
        }
        self.compaction_ratio = ratio;
        Ok(self)
    }

    fn build(
        capacity: usize,
        load_factor: f64,
        hasher: H,
    ) -> Self {
        Self {
            slots: empty_slots(capacity),
            len: 0,
            tombstones: 0,
            load_factor_threshold: load_factor,
            probe_step: ProbeStep::default(),
            compaction_ratio: None,
            hasher,
        }
    }

    /// Количество живых пар.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Количество ячеек.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Текущая заполненность `len / capacity`.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    #[inline]
    pub fn load_factor_threshold(&self) -> f64 {
        self.load_factor_threshold
    }

    /// Количество ячеек `Deleted`.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    pub fn probe_step(&self) -> ProbeStep {
        self.probe_step
    }

    #[inline]
    pub fn compaction_ratio(&self) -> Option<f64> {
        self.compaction_ratio
    }

    #[inline]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Итератор по парам в порядке индексов ячеек.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Удаляет все пары, сохраняя ёмкость.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = Slot::Empty);
        self.len = 0;
        self.tombstones = 0;
    }

    /// Достигнут ли порог при `len` парах и ёмкости `capacity`.
    #[inline]
    fn reaches_threshold(
        &self,
        len: usize,
        capacity: usize,
    ) -> bool {
        len as f64 / capacity as f64 >= self.load_factor_threshold
    }

    fn needs_compaction(&self) -> bool {
        match self.compaction_ratio {
            Some(ratio) if self.tombstones > 0 => {
                self.tombstones as f64 / self.capacity() as f64 >= ratio
            }
            _ => false,
        }
    }
}

impl<K, V, H> OaTable<K, V, H>
where
    K: Eq,
    H: KeyHasher<K>,
{
    /// Создаёт таблицу по секции `[table]` конфигурации.
    pub fn from_config(config: &TableConfig) -> Result<Self, TableError>
    where
        H: Default,
    {
        Self::with_hasher(config.initial_capacity, config.load_factor, H::default())?
            .with_probe_step(config.probe_step)?
            .with_compaction_ratio(config.compaction_ratio)
    }

    /// Задаёт стратегию шага двойного хеширования (см. [`Self::set_probe_step`]).
    pub fn with_probe_step(
        mut self,
        probe_step: ProbeStep,
    ) -> Result<Self, TableError> {
        self.set_probe_step(probe_step)?;
        Ok(self)
    }

    /// Меняет стратегию шага двойного хеширования.
    ///
    /// Непустая таблица перестраивается под новые пробные
    /// последовательности. При ошибке таблица и стратегия остаются
    /// прежними.
    pub fn set_probe_step(
        &mut self,
        probe_step: ProbeStep,
    ) -> Result<(), TableError> {
        if probe_step == self.probe_step {
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.probe_step, probe_step);
        if self.len == 0 && self.tombstones == 0 {
            return Ok(());
        }

        if let Err(err) = self.rebuild(self.capacity()) {
            self.probe_step = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Вставляет пару или обновляет значение существующего ключа.
    ///
    /// Возвращает `Ok(true)`, если ключ новый, и `Ok(false)` при обновлении.
    /// `TableError::TableFull` означает, что за `capacity` проб не нашлось
    /// свободной ячейки; таблица при этом не изменяется.
    pub fn insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<bool, TableError> {
        self.reserve_for_insert()?;

        let hash = self.hash_of(&key);
        match self.locate(hash, &key) {
            Placement::Existing(idx) => {
                if let Slot::Occupied { value: v, .. } = &mut self.slots[idx] {
                    *v = value;
                }
                Ok(false)
            }
            Placement::Vacant(idx) => {
                if self.slots[idx].is_deleted() {
                    self.tombstones -= 1;
                }
                self.slots[idx] = Slot::Occupied { key, value };
                self.len += 1;
                Ok(true)
            }
            Placement::Full => {
                let capacity = self.capacity();
                warn!(
                    capacity,
                    len = self.len,
                    probe_step = %self.probe_step,
                    "no free slot within probe sequence"
                );
                Err(TableError::TableFull {
                    capacity,
                    attempts: capacity,
                })
            }
        }
    }

    /// Вставляет все пары из итератора, останавливаясь на первой ошибке.
    ///
    /// Возвращает число новых ключей.
    pub fn try_extend<I>(
        &mut self,
        iter: I,
    ) -> Result<usize, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut added = 0;
        for (key, value) in iter {
            if self.insert(key, value)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Перестраивает таблицу в текущей ёмкости, удаляя все tombstone'ы.
    ///
    /// При стратегии `ProbeStep::Reference` ёмкость может вырасти, если
    /// ключи не удаётся разместить.
    pub fn compact(&mut self) -> Result<(), TableError> {
        if self.tombstones == 0 {
            return Ok(());
        }
        self.rebuild(self.capacity())
    }

    /// Снимок заполненности и длин проб.
    pub fn stats(&self) -> TableStats {
        let capacity = self.capacity();
        let mut stats = TableStats::empty(capacity);
        stats.len = self.len;
        stats.tombstones = self.tombstones;
        stats.empty = capacity - self.len - self.tombstones;
        stats.load_factor = self.load_factor();
        stats.tombstone_ratio = self.tombstones as f64 / capacity as f64;

        let mut total = 0usize;
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                let probes = self
                    .probe(self.hash_of(key))
                    .position(|i| i == idx)
                    .map_or(capacity, |p| p + 1);
                total += probes;
                stats.max_probe_len = stats.max_probe_len.max(probes);
            }
        }
        if self.len > 0 {
            stats.avg_probe_len = total as f64 / self.len as f64;
        }

        stats
    }

    /// Проверяет все инварианты таблицы.
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        validate!(!self.slots.is_empty(), ValidationError::EmptySlotArray);

        let occupied = self.slots.iter().filter(|s| s.is_occupied()).count();
        validate!(
            occupied == self.len,
            ValidationError::LengthMismatch {
                expected: self.len,
                actual: occupied,
            }
        );

        let deleted = self.slots.iter().filter(|s| s.is_deleted()).count();
        validate!(
            deleted == self.tombstones,
            ValidationError::TombstoneMismatch {
                expected: self.tombstones,
                actual: deleted,
            }
        );

        for (idx, slot) in self.slots.iter().enumerate() {
            let Slot::Occupied { key, .. } = slot else {
                continue;
            };

            let mut reached = false;
            for probe_idx in self.probe(self.hash_of(key)) {
                if probe_idx == idx {
                    reached = true;
                    break;
                }
                match &self.slots[probe_idx] {
                    Slot::Empty => break,
                    Slot::Occupied { key: other, .. } if other == key => {
                        return Err(ValidationError::DuplicateKey {
                            first: probe_idx,
                            second: idx,
                        });
                    }
                    _ => {}
                }
            }
            validate!(reached, ValidationError::UnreachableKey { slot: idx });
        }

        Ok(())
    }

    /// Выполняет рехеширование или компакцию перед вставкой.
    fn reserve_for_insert(&mut self) -> Result<(), TableError> {
        let capacity = self.capacity();

        if self.reaches_threshold(self.len, capacity) {
            let mut target = capacity;
            while self.reaches_threshold(self.len, target) {
                target = target.checked_mul(2).ok_or(TableError::TableFull {
                    capacity,
                    attempts: 0,
                })?;
            }
            return self.rebuild(target);
        }

        if self.needs_compaction() {
            trace!(
                tombstones = self.tombstones,
                capacity,
                "tombstone ratio reached, compacting"
            );
            return self.rebuild(capacity);
        }

        Ok(())
    }

    /// Переносит все занятые ячейки в новый массив ёмкостью не меньше
    /// `min_capacity`.
    ///
    /// Сначала строится полный план размещения, и только потом ячейки
    /// переносятся и массив подменяется. Если ключи не удаётся разместить
    /// (возможно только при `ProbeStep::Reference`), ёмкость удваивается.
    fn rebuild(
        &mut self,
        min_capacity: usize,
    ) -> Result<(), TableError> {
        let old_capacity = self.capacity();
        let mut capacity = min_capacity;

        let plan = loop {
            if let Some(plan) = self.plan_layout(capacity) {
                break plan;
            }
            trace!(capacity, "layout failed, doubling again");
            capacity = capacity.checked_mul(2).ok_or(TableError::TableFull {
                capacity,
                attempts: capacity,
            })?;
        };

        let mut fresh = empty_slots(capacity);
        for (from, to) in plan {
            fresh[to] = std::mem::take(&mut self.slots[from]);
        }

        let dropped = self.tombstones;
        self.slots = fresh;
        self.tombstones = 0;

        debug!(
            old_capacity,
            new_capacity = capacity,
            len = self.len,
            dropped_tombstones = dropped,
            "table rebuilt"
        );
        Ok(())
    }

    /// Строит план `(старый индекс, новый индекс)` для всех занятых ячеек в
    /// порядке индексов, не трогая текущий массив.
    fn plan_layout(
        &self,
        capacity: usize,
    ) -> Option<Vec<(usize, usize)>> {
        let mut taken = vec![false; capacity];
        let mut plan = Vec::with_capacity(self.len);

        for (from, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                let hash = self.hash_of(key);
                let to = ProbeSeq::new(hash, capacity, self.probe_step).find(|&i| !taken[i])?;
                taken[to] = true;
                plan.push((from, to));
            }
        }

        Some(plan)
    }

    /// Ищет ячейку для вставки `key`.
    ///
    /// Первый встреченный tombstone запоминается, но поиск продолжается до
    /// `Empty` или совпадения, чтобы не создать дубликат ключа, лежащего
    /// дальше tombstone'а.
    fn locate(
        &self,
        hash: u64,
        key: &K,
    ) -> Placement {
        let mut first_free = None;

        for idx in self.probe(hash) {
            match &self.slots[idx] {
                Slot::Empty => return Placement::Vacant(first_free.unwrap_or(idx)),
                Slot::Deleted => {
                    first_free.get_or_insert(idx);
                }
                Slot::Occupied { key: k, .. } => {
                    if k == key {
                        return Placement::Existing(idx);
                    }
                }
            }
        }

        match first_free {
            Some(idx) => Placement::Vacant(idx),
            None => Placement::Full,
        }
    }

    #[inline]
    fn hash_of(
        &self,
        key: &K,
    ) -> u64 {
        <H as KeyHasher<K>>::hash_key(&self.hasher, key)
    }

    #[inline]
    fn probe(
        &self,
        hash: u64,
    ) -> ProbeSeq {
        ProbeSeq::new(hash, self.capacity(), self.probe_step)
    }
}

impl<K, V, H> OaTable<K, V, H> {
    /// Возвращает ссылку на значение по ключу.
    pub fn get<Q>(
        &self,
        key: &Q,
    ) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let idx = self.find_index(key)?;
        self.slots[idx].entry().map(|(_, v)| v)
    }

    /// Возвращает изменяемую ссылку на значение по ключу.
    pub fn get_mut<Q>(
        &mut self,
        key: &Q,
    ) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let idx = self.find_index(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains_key<Q>(
        &self,
        key: &Q,
    ) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.find_index(key).is_some()
    }

    /// Удаляет ключ, оставляя tombstone. Возвращает `true`, если ключ был.
    pub fn remove<Q>(
        &mut self,
        key: &Q,
    ) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.take(key).is_some()
    }

    /// Удаляет ключ и возвращает его значение.
    pub fn take<Q>(
        &mut self,
        key: &Q,
    ) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let idx = self.find_index(key)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Deleted) {
            Slot::Occupied { value, .. } => {
                self.len -= 1;
                self.tombstones += 1;
                Some(value)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    /// Индекс ячейки с ключом `key`.
    ///
    /// `Empty` обрывает поиск, `Deleted` пропускается.
    fn find_index<Q>(
        &self,
        key: &Q,
    ) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        if self.len == 0 {
            return None;
        }

        let hash = <H as KeyHasher<Q>>::hash_key(&self.hasher, key);
        for idx in ProbeSeq::new(hash, self.capacity(), self.probe_step) {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Deleted => continue,
                Slot::Occupied { key: k, .. } => {
                    if <K as Borrow<Q>>::borrow(k) == key {
                        return Some(idx);
                    }
                }
            }
        }

        None
    }
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::default);
    slots
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для OaTable
////////////////////////////////////////////////////////////////////////////////

impl<K, V, H: Default> Default for OaTable<K, V, H> {
    fn default() -> Self {
        Self::build(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, H::default())
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Some(entry) = slot.entry() {
                self.remaining -= 1;
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, H> IntoIterator for &'a OaTable<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Построчный вывод занятых ячеек: `slot [i]: {key = value}`.
impl<K, V, H> fmt::Display for OaTable<K, V, H>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some((key, value)) = slot.entry() {
                writeln!(f, "slot [{idx}]: {{{key} = {value}}}")?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
