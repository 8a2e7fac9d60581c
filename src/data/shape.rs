// --- Файл: src/data/shape.rs ---

//! Целевая форма изображения в батче.

use super::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// Форма одного изображения после аугментации.
///
/// Проверяется один раз при создании итератора, дальше код
/// работает с уже корректным значением.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetShape {
    /// Полутоновое изображение (H, W).
    Gray { height: usize, width: usize },
    /// Многоканальное изображение (H, W, C).
    Color {
        height: usize,
        width: usize,
        channels: usize,
    },
}

impl TargetShape {
    /// Строит форму из среза размерностей (2 или 3 положительных числа).
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if dims.iter().any(|&d| d == 0) {
            return Err(DataError::InvalidShape {
                shape: dims.to_vec(),
                reason: "все размерности должны быть положительными".to_string(),
            });
        }
        match *dims {
            [height, width] => Ok(TargetShape::Gray { height, width }),
            [height, width, channels] => Ok(TargetShape::Color {
                height,
                width,
                channels,
            }),
            _ => Err(DataError::InvalidShape {
                shape: dims.to_vec(),
                reason: format!("ожидалось 2 или 3 измерения, получено {}", dims.len()),
            }),
        }
    }

    pub fn height(&self) -> usize {
        match *self {
            TargetShape::Gray { height, .. } | TargetShape::Color { height, .. } => height,
        }
    }

    pub fn width(&self) -> usize {
        match *self {
            TargetShape::Gray { width, .. } | TargetShape::Color { width, .. } => width,
        }
    }

    /// Количество каналов; у полутонового изображения один канал.
    pub fn channels(&self) -> usize {
        match *self {
            TargetShape::Gray { .. } => 1,
            TargetShape::Color { channels, .. } => channels,
        }
    }

    pub fn is_square(&self) -> bool {
        self.height() == self.width()
    }

    /// Размерности в виде вектора, как у `ndarray`.
    pub fn dims(&self) -> Vec<usize> {
        match *self {
            TargetShape::Gray { height, width } => vec![height, width],
            TargetShape::Color {
                height,
                width,
                channels,
            } => vec![height, width, channels],
        }
    }
}
