// --- Файл: src/vis.rs ---

//! Сохранение изображений и батчей в PNG для визуальной проверки.

use crate::data::{Batch, DataError, LabelCatalog};
use image::{imageops, Rgb, RgbImage};
use ndarray::ArrayViewD;
use std::path::Path;
use thiserror::Error;

/// Отступ между ячейками сетки, в пикселях.
const GRID_PADDING: u32 = 2;

/// Ошибки визуализации.
#[derive(Error, Debug)]
pub enum VisError {
    #[error("Неподдерживаемая форма изображения: {0:?}")]
    UnsupportedShape(Vec<usize>),

    #[error("Число столбцов сетки должно быть положительным")]
    ZeroColumns,

    #[error("Ошибка записи изображения: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Data(#[from] DataError),
}

type Result<T> = std::result::Result<T, VisError>;

/// Переводит массив (H, W), (H, W, 1) или (H, W, 3) в RGB.
///
/// Значения нормализуются по минимуму и максимуму в [0, 255].
pub fn array_to_rgb(image: ArrayViewD<f32>) -> Result<RgbImage> {
    let shape = image.shape().to_vec();
    let (h, w, c) = match shape.as_slice() {
        &[h, w] => (h, w, 1),
        &[h, w, c] if c == 1 || c == 3 => (h, w, c),
        _ => return Err(VisError::UnsupportedShape(shape)),
    };

    let min_val = image.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max_val = image.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let range = if (max_val - min_val).abs() < 1e-6 {
        1.0
    } else {
        max_val - min_val
    };
    let to_u8 = |v: f32| ((v - min_val) / range * 255.0).round().clamp(0.0, 255.0) as u8;

    let pixel = |y: usize, x: usize, ch: usize| -> f32 {
        if c == 1 {
            if shape.len() == 2 {
                image[[y, x]]
            } else {
                image[[y, x, 0]]
            }
        } else {
            image[[y, x, ch]]
        }
    };

    Ok(RgbImage::from_fn(w as u32, h as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb([
            to_u8(pixel(y, x, 0)),
            to_u8(pixel(y, x, 1)),
            to_u8(pixel(y, x, 2)),
        ])
    }))
}

/// Раскладывает батч сеткой из `cols` столбцов.
///
/// Возвращает изображение сетки и имена классов в порядке ячеек.
pub fn render_batch_grid(
    batch: &Batch,
    catalog: &LabelCatalog,
    cols: usize,
) -> Result<(RgbImage, Vec<String>)> {
    if cols == 0 {
        return Err(VisError::ZeroColumns);
    }

    let tiles = (0..batch.len())
        .map(|i| array_to_rgb(batch.image(i)))
        .collect::<Result<Vec<_>>>()?;
    let titles = batch
        .labels
        .iter()
        .map(|&label| catalog.class_name(label).map(str::to_string))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (tile_w, tile_h) = tiles.first().map(|t| t.dimensions()).unwrap_or((0, 0));
    let rows = batch.len().div_ceil(cols);
    let cell_w = tile_w + GRID_PADDING;
    let cell_h = tile_h + GRID_PADDING;

    let mut canvas = RgbImage::new(cell_w * cols as u32, cell_h * rows as u32);
    for (i, tile) in tiles.iter().enumerate() {
        let x = (i % cols) as u32 * cell_w;
        let y = (i / cols) as u32 * cell_h;
        imageops::replace(&mut canvas, tile, x as i64, y as i64);
    }

    Ok((canvas, titles))
}

/// Сохраняет сетку батча в файл; возвращает имена классов.
pub fn save_batch_grid<P: AsRef<Path>>(
    batch: &Batch,
    catalog: &LabelCatalog,
    cols: usize,
    path: P,
) -> Result<Vec<String>> {
    let (canvas, titles) = render_batch_grid(batch, catalog, cols)?;
    canvas.save(path)?;
    Ok(titles)
}

/// Сохраняет одно изображение (например, узор) в файл.
pub fn save_array<P: AsRef<Path>>(image: ArrayViewD<f32>, path: P) -> Result<()> {
    array_to_rgb(image)?.save(path)?;
    Ok(())
}
