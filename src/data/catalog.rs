// --- Файл: src/data/catalog.rs ---

//! Каталог меток: идентификатор образца -> класс -> имя класса.

use super::error::{DataError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Идентификатор образца (имя файла без расширения).
pub type SampleId = String;

/// Индекс класса.
pub type Label = usize;

/// Имена классов CIFAR-10, используемые по умолчанию.
pub const CIFAR10_CLASSES: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

/// Неизменяемое отображение образцов на метки.
///
/// Загружается один раз и после этого только читается, поэтому
/// его можно разделять между потоками без блокировок.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    labels: HashMap<SampleId, Label>,
    class_names: Vec<String>,
}

impl LabelCatalog {
    /// Создает каталог из готового отображения с классами CIFAR-10.
    pub fn from_map(labels: HashMap<SampleId, Label>) -> Self {
        Self {
            labels,
            class_names: CIFAR10_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Загружает JSON-объект вида `{"<id>": <метка>, ...}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DataError::LabelSource {
            path: path.to_path_buf(),
            source,
        })?;
        let labels: HashMap<SampleId, Label> =
            serde_json::from_str(&text).map_err(|source| DataError::LabelFormat {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Загружено {} меток из {}", labels.len(), path.display());
        Ok(Self::from_map(labels))
    }

    /// Заменяет таблицу имен классов.
    pub fn with_class_names<S: Into<String>>(mut self, names: Vec<S>) -> Self {
        self.class_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Метка образца.
    pub fn label_of(&self, id: &str) -> Result<Label> {
        self.labels
            .get(id)
            .copied()
            .ok_or_else(|| DataError::MissingLabel { id: id.to_string() })
    }

    /// Имя класса по его индексу.
    pub fn class_name(&self, label: Label) -> Result<&str> {
        self.class_names
            .get(label)
            .map(String::as_str)
            .ok_or(DataError::UnknownClass {
                label,
                num_classes: self.class_names.len(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.labels.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}
