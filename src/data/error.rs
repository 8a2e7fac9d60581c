// --- Файл: src/data/error.rs ---

//! Ошибки модуля загрузки данных.

use std::path::PathBuf;
use thiserror::Error;

/// Все ошибки, которые может вернуть генератор батчей.
///
/// Варианты разделены на три группы:
/// - ошибки конфигурации (обнаруживаются при создании итератора);
/// - ошибки каталога меток (`MissingLabel`, `UnknownClass`);
/// - ошибки образцов (`SampleLoad`, `SampleShape`), которые прерывают текущий батч.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Размер батча должен быть положительным, получено {0}")]
    InvalidBatchSize(usize),

    #[error("Недопустимая целевая форма {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },

    #[error("Не удалось прочитать файл меток {path}: {source}")]
    LabelSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Некорректный формат файла меток {path}: {source}")]
    LabelFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Не удалось открыть директорию с образцами {path}: {source}")]
    SampleDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Датасет пуст: {0}")]
    EmptyDataset(String),

    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    #[error("Для образца '{id}' нет метки")]
    MissingLabel { id: String },

    #[error("Неизвестный класс {label} (всего классов: {num_classes})")]
    UnknownClass { label: usize, num_classes: usize },

    #[error("Не удалось загрузить образец '{id}': {reason}")]
    SampleLoad { id: String, reason: String },

    #[error("Образец '{id}' формы {shape:?} нельзя привести к {target:?}")]
    SampleShape {
        id: String,
        shape: Vec<usize>,
        target: Vec<usize>,
    },
}

impl DataError {
    /// Является ли ошибка ошибкой конфигурации (а не проблемой конкретных данных).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DataError::InvalidBatchSize(_)
                | DataError::InvalidShape { .. }
                | DataError::LabelSource { .. }
                | DataError::LabelFormat { .. }
                | DataError::SampleDirectory { .. }
                | DataError::EmptyDataset(_)
                | DataError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_split() {
        assert!(DataError::InvalidBatchSize(0).is_configuration());
        assert!(DataError::EmptyDataset("x".into()).is_configuration());
        assert!(!DataError::MissingLabel { id: "a".into() }.is_configuration());
        assert!(!DataError::SampleLoad {
            id: "a".into(),
            reason: "broken".into()
        }
        .is_configuration());
    }

    #[test]
    fn test_display_mentions_id() {
        let err = DataError::MissingLabel { id: "42".into() };
        assert!(err.to_string().contains("42"));
    }
}
