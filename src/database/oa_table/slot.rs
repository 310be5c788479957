/// Состояние одной ячейки таблицы с открытой адресацией.
///
/// `Deleted` (tombstone) не содержит данных и не совпадает ни с одним
/// ключом, но, в отличие от `Empty`, не обрывает пробную
/// последовательность.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<K, V> {
    Empty,
    Occupied { key: K, value: V },
    Deleted,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<K, V> Slot<K, V> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Slot::Deleted)
    }

    /// Возвращает `(&K, &V)` для занятой ячейки.
    #[inline]
    pub fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для Slot
////////////////////////////////////////////////////////////////////////////////

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
