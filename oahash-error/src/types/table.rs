use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки операций над таблицей с открытой адресацией.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Пробная последовательность исчерпана без свободной ячейки.
    #[error("Table is full: no free slot after {attempts} probes (capacity {capacity})")]
    TableFull { capacity: usize, attempts: usize },
    /// Недопустимая начальная ёмкость.
    #[error("Invalid capacity {capacity}: must be at least 1")]
    InvalidCapacity { capacity: usize },
    /// Порог заполнения вне интервала (0, 1).
    #[error("Invalid load factor {load_factor}: must lie in (0, 1)")]
    InvalidLoadFactor { load_factor: f64 },
    /// Порог компакции вне интервала (0, 1].
    #[error("Invalid compaction ratio {ratio}: must lie in (0, 1]")]
    InvalidCompactionRatio { ratio: f64 },
}

impl TableError {
    /// Можно ли продолжать работу с таблицей после ошибки.
    ///
    /// Таблица после любой из этих ошибок остаётся согласованной.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TableFull { .. })
    }
}

impl ErrorExt for TableError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::TableFull { .. } => StatusCode::TableFull,
            Self::InvalidCapacity { .. } => StatusCode::InvalidCapacity,
            Self::InvalidLoadFactor { .. } => StatusCode::InvalidLoadFactor,
            Self::InvalidCompactionRatio { .. } => StatusCode::InvalidCompactionRatio,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
            ("recoverable", self.is_recoverable().to_string()),
        ];

        if let Self::TableFull { capacity, .. } = self {
            tags.push(("capacity", capacity.to_string()));
        }

        tags
    }
}
