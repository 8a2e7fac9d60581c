// --- Файл: src/data/config.rs ---

//! Конфигурация генератора батчей.

use super::error::{DataError, Result};
use super::shape::TargetShape;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Параметры генератора батчей.
///
/// Может быть загружена из JSON; отсутствующие поля берутся из `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Директория с файлами `<id>.npy`
    pub data_dir: PathBuf,
    /// JSON-файл с метками
    pub label_file: PathBuf,
    /// Размер батча
    pub batch_size: usize,
    /// Целевая форма изображения: [H, W] или [H, W, C]
    pub image_shape: Vec<usize>,
    /// Перемешивать ли данные в каждой эпохе
    pub shuffle: bool,
    /// Случайное отражение
    pub mirroring: bool,
    /// Случайный поворот на 90/180/270 градусов
    pub rotation: bool,
    /// Seed генератора случайных чисел
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/exercise_data"),
            label_file: PathBuf::from("data/Labels.json"),
            batch_size: 10,
            image_shape: vec![32, 32, 3],
            shuffle: false,
            mirroring: false,
            rotation: false,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Загружает конфигурацию из JSON-файла.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| DataError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Сохраняет конфигурацию в JSON-файл.
    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| DataError::Config(e.to_string()))?;
        fs::write(path, text).map_err(|e| DataError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Проверяет размер батча и форму; возвращает разобранную форму.
    pub fn validate(&self) -> Result<TargetShape> {
        if self.batch_size == 0 {
            return Err(DataError::InvalidBatchSize(self.batch_size));
        }
        TargetShape::from_dims(&self.image_shape)
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn image_shape(mut self, shape: Vec<usize>) -> Self {
        self.image_shape = shape;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn mirroring(mut self, mirroring: bool) -> Self {
        self.mirroring = mirroring;
        self
    }

    pub fn rotation(mut self, rotation: bool) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
