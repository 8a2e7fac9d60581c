// --- Файл: src/patterns.rs ---

//! Детерминированные тестовые узоры: шахматная доска, круг и цветовой спектр.
//!
//! Генератор батчей от этого модуля не зависит; узоры используются для
//! проверки визуализации и как синтетические изображения.

use ndarray::{Array2, Array3, ArrayD};
use thiserror::Error;

/// Ошибки построения узоров.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatternError {
    #[error("Разрешение должно быть положительным")]
    InvalidResolution,

    #[error("Разрешение {resolution} не делится на 2 * {tile_size}")]
    InvalidTiling { resolution: usize, tile_size: usize },
}

type Result<T> = std::result::Result<T, PatternError>;

/// Общий интерфейс узоров.
pub trait Pattern {
    /// Строит изображение. Каждый вызов возвращает новую копию.
    fn draw(&self) -> ArrayD<f32>;

    /// Имя узора.
    fn name(&self) -> &str;
}

/// Шахматная доска из квадратов `tile_size x tile_size`.
///
/// Левый верхний квадрат черный (0), соседние чередуются.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checker {
    resolution: usize,
    tile_size: usize,
}

impl Checker {
    pub fn new(resolution: usize, tile_size: usize) -> Result<Self> {
        if resolution == 0 {
            return Err(PatternError::InvalidResolution);
        }
        if tile_size == 0 || resolution % (2 * tile_size) != 0 {
            return Err(PatternError::InvalidTiling {
                resolution,
                tile_size,
            });
        }
        Ok(Self {
            resolution,
            tile_size,
        })
    }
}

impl Pattern for Checker {
    fn draw(&self) -> ArrayD<f32> {
        let t = self.tile_size;
        Array2::from_shape_fn((self.resolution, self.resolution), |(y, x)| {
            ((y / t + x / t) % 2) as f32
        })
        .into_dyn()
    }

    fn name(&self) -> &str {
        "checker"
    }
}

/// Закрашенный круг на черном фоне.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    resolution: usize,
    radius: f32,
    /// Центр (x, y): x - столбец, y - строка
    center: (f32, f32),
}

impl Circle {
    pub fn new(resolution: usize, radius: f32, center: (f32, f32)) -> Result<Self> {
        if resolution == 0 {
            return Err(PatternError::InvalidResolution);
        }
        Ok(Self {
            resolution,
            radius,
            center,
        })
    }
}

impl Pattern for Circle {
    fn draw(&self) -> ArrayD<f32> {
        let (cx, cy) = self.center;
        Array2::from_shape_fn((self.resolution, self.resolution), |(y, x)| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if (dx * dx + dy * dy).sqrt() <= self.radius {
                1.0
            } else {
                0.0
            }
        })
        .into_dyn()
    }

    fn name(&self) -> &str {
        "circle"
    }
}

/// RGB-спектр: красный растет слева направо, зеленый сверху вниз,
/// синий убывает слева направо. Значения в [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spectrum {
    resolution: usize,
}

impl Spectrum {
    pub fn new(resolution: usize) -> Result<Self> {
        if resolution == 0 {
            return Err(PatternError::InvalidResolution);
        }
        Ok(Self { resolution })
    }
}

/// Аналог `numpy.linspace(0, 1, n)[i]`.
fn linspace_unit(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}

impl Pattern for Spectrum {
    fn draw(&self) -> ArrayD<f32> {
        let n = self.resolution;
        Array3::from_shape_fn((n, n, 3), |(y, x, c)| match c {
            0 => linspace_unit(x, n),
            1 => linspace_unit(y, n),
            _ => 1.0 - linspace_unit(x, n),
        })
        .into_dyn()
    }

    fn name(&self) -> &str {
        "spectrum"
    }
}
