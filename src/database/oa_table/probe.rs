use num_integer::Integer;
use serde::{Deserialize, Serialize};

/// Способ вычисления шага двойного хеширования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStep {
    /// Шаг `1 + h mod (capacity - 1)` сдвигается внутри `[1, capacity - 1]`,
    /// пока не станет взаимно простым с ёмкостью. Первые `capacity` проб
    /// обходят все ячейки.
    #[default]
    Coprime,
    /// Шаг `1 + h mod (capacity - 1)` без поправок. При общем делителе с
    /// ёмкостью последовательность может зациклиться на подмножестве ячеек.
    Reference,
}

/// Пробная последовательность `(h1 + i * h2) mod capacity` для
/// `i = 0..capacity`.
#[derive(Debug, Clone)]
pub struct ProbeSeq {
    current: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ProbeStep {
    /// Вычисляет шаг для данного хеша и ёмкости.
    pub fn step_for(
        self,
        hash: u64,
        capacity: usize,
    ) -> usize {
        if capacity <= 1 {
            return 1;
        }

        let modulus = (capacity - 1) as u64;
        let mut step = 1 + (hash % modulus) as usize;

        if self == ProbeStep::Coprime {
            if capacity.is_power_of_two() {
                // Для степени двойки достаточно нечётного шага.
                step |= 1;
            } else {
                while step.gcd(&capacity) != 1 {
                    step = step % (capacity - 1) + 1;
                }
            }
        }

        step
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStep::Coprime => "coprime",
            ProbeStep::Reference => "reference",
        }
    }
}

impl ProbeSeq {
    /// Строит последовательность для ключа с хешем `hash`.
    ///
    /// `capacity` должна быть не меньше 1.
    pub fn new(
        hash: u64,
        capacity: usize,
        strategy: ProbeStep,
    ) -> Self {
        debug_assert!(capacity >= 1, "probe sequence over empty slot array");
        Self {
            current: (hash % capacity as u64) as usize,
            step: strategy.step_for(hash, capacity),
            capacity,
            remaining: capacity,
        }
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для ProbeSeq
////////////////////////////////////////////////////////////////////////////////

impl Iterator for ProbeSeq {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let idx = self.current;
        let next = self.current + self.step;
        self.current = if next >= self.capacity {
            next % self.capacity
        } else {
            next
        };
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSeq {}

impl std::fmt::Display for ProbeStep {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
