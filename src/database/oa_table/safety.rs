/// Макрос для валидации условий с возвратом ошибки.
#[macro_export]
macro_rules! validate {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Нарушение внутренних инвариантов таблицы.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Массив ячеек пуст
    EmptySlotArray,
    /// Счётчик `len` не совпадает с числом занятых ячеек
    LengthMismatch { expected: usize, actual: usize },
    /// Счётчик tombstone'ов не совпадает с числом ячеек `Deleted`
    TombstoneMismatch { expected: usize, actual: usize },
    /// Ключ недостижим: пробная последовательность встречает `Empty`
    /// раньше его ячейки или не проходит через неё вовсе
    UnreachableKey { slot: usize },
    /// Один и тот же ключ занимает две ячейки
    DuplicateKey { first: usize, second: usize },
}

/// Снимок заполненности таблицы и длин пробных последовательностей.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    /// Ёмкость (число ячеек)
    pub capacity: usize,
    /// Число занятых ячеек
    pub len: usize,
    /// Число ячеек `Deleted`
    pub tombstones: usize,
    /// Число ячеек `Empty`
    pub empty: usize,
    /// `len / capacity`
    pub load_factor: f64,
    /// `tombstones / capacity`
    pub tombstone_ratio: f64,
    /// Средняя длина пробы до ячейки ключа (1 = попадание с первой пробы)
    pub avg_probe_len: f64,
    /// Максимальная длина пробы
    pub max_probe_len: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl TableStats {
    /// Создаёт статистику пустой таблицы заданной ёмкости.
    pub fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            len: 0,
            tombstones: 0,
            empty: capacity,
            load_factor: 0.0,
            tombstone_ratio: 0.0,
            avg_probe_len: 0.0,
            max_probe_len: 0,
        }
    }

    /// Форматирует статистику для вывода.
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("OaTable Statistics:\n");
        report.push_str(&format!("  Capacity: {}\n", self.capacity));
        report.push_str(&format!(
            "  Occupied: {} ({:.1}%)\n",
            self.len,
            self.load_factor * 100.0
        ));
        report.push_str(&format!(
            "  Tombstones: {} ({:.1}%)\n",
            self.tombstones,
            self.tombstone_ratio * 100.0
        ));
        report.push_str(&format!("  Empty: {}\n", self.empty));
        report.push_str(&format!(
            "  Probe length: avg {:.2}, max {}\n",
            self.avg_probe_len, self.max_probe_len
        ));
        report
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ValidationError::EmptySlotArray => write!(f, "Slot array is empty"),
            ValidationError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected}, got {actual}")
            }
            ValidationError::TombstoneMismatch { expected, actual } => {
                write!(
                    f,
                    "Tombstone count mismatch: expected {expected}, got {actual}"
                )
            }
            ValidationError::UnreachableKey { slot } => {
                write!(f, "Key in slot {slot} is unreachable by its probe sequence")
            }
            ValidationError::DuplicateKey { first, second } => {
                write!(f, "Duplicate key in slots {first} and {second}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
