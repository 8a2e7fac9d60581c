// --- Файл: src/data/sampler.rs ---

//! Бесконечный сэмплер по эпохам: перестановка индексов, курсор и счетчик эпох.

use rand::seq::SliceRandom;
use rand::RngCore;

/// Состояние сэмплера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Курсор указывает на элемент текущей перестановки.
    Ready,
    /// Курсор дошел до конца перестановки; следующий запрос вызовет смену эпохи.
    Exhausted,
}

/// Сохраненное состояние для отката незавершенного батча.
#[derive(Debug, Clone)]
struct Pending {
    cursor: usize,
    epoch: usize,
    /// Перестановка до первой перетасовки внутри транзакции.
    permutation: Option<Vec<usize>>,
}

/// Циклический сэмплер индексов датасета.
///
/// Внутри одной эпохи каждый индекс выдается ровно один раз в порядке
/// перестановки. При исчерпании перестановки курсор сбрасывается в 0,
/// счетчик эпох увеличивается на 1, а при `shuffle == true` перестановка
/// перемешивается заново. Смена эпохи может случиться посреди батча.
#[derive(Debug, Clone)]
pub struct EpochSampler {
    permutation: Vec<usize>,
    cursor: usize,
    epoch: usize,
    shuffle: bool,
    pending: Option<Pending>,
}

impl EpochSampler {
    /// Создает сэмплер для датасета из `len` элементов.
    ///
    /// При `shuffle == true` уже первая эпоха идет в случайном порядке.
    pub fn new(len: usize, shuffle: bool, rng: &mut dyn RngCore) -> Self {
        let mut permutation: Vec<usize> = (0..len).collect();
        if shuffle {
            permutation.shuffle(rng);
        }
        Self {
            permutation,
            cursor: 0,
            epoch: 0,
            shuffle,
            pending: None,
        }
    }

    pub fn state(&self) -> SamplerState {
        if self.cursor < self.permutation.len() {
            SamplerState::Ready
        } else {
            SamplerState::Exhausted
        }
    }

    /// Единственная функция перехода: при необходимости меняет эпоху,
    /// затем выдает индекс под курсором и сдвигает курсор.
    ///
    /// Возвращает `None` только для пустого датасета.
    pub fn next_position(&mut self, rng: &mut dyn RngCore) -> Option<usize> {
        if self.permutation.is_empty() {
            return None;
        }
        if self.state() == SamplerState::Exhausted {
            self.rollover(rng);
        }
        let position = self.permutation[self.cursor];
        self.cursor += 1;
        Some(position)
    }

    fn rollover(&mut self, rng: &mut dyn RngCore) {
        self.cursor = 0;
        self.epoch += 1;
        if self.shuffle {
            if let Some(pending) = self.pending.as_mut() {
                if pending.permutation.is_none() {
                    pending.permutation = Some(self.permutation.clone());
                }
            }
            self.permutation.shuffle(rng);
        }
        log::debug!(
            "Начало эпохи {} (перемешивание: {})",
            self.epoch,
            self.shuffle
        );
    }

    /// Запоминает текущее состояние перед сборкой батча.
    pub fn begin(&mut self) {
        self.pending = Some(Pending {
            cursor: self.cursor,
            epoch: self.epoch,
            permutation: None,
        });
    }

    /// Подтверждает изменения, сделанные после `begin`.
    pub fn commit(&mut self) {
        self.pending = None;
    }

    /// Возвращает состояние, сохраненное в `begin`.
    pub fn rollback(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.cursor = pending.cursor;
            self.epoch = pending.epoch;
            if let Some(permutation) = pending.permutation {
                self.permutation = permutation;
            }
        }
    }

    /// Число завершенных проходов по датасету.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Текущая перестановка индексов.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }
}
