// --- Файл: src/data/augment.rs ---

//! Аугментация изображений: изменение размера, отражение и поворот.
//!
//! Внутри все шаги работают с массивами формы (H, W, C). Полутоновые
//! изображения хранятся как (H, W, 1) и превращаются обратно в (H, W)
//! только на выходе конвейера.

use super::error::{DataError, Result};
use super::shape::TargetShape;
use ndarray::{s, Array3, ArrayD, ArrayView3, Axis, Ix2, Ix3};
use rand::{Rng, RngCore};

/// Ось отражения.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAxis {
    /// Слева направо (`numpy.fliplr`).
    Horizontal,
    /// Сверху вниз (`numpy.flipud`).
    Vertical,
}

/// Случайное геометрическое преобразование, сохраняющее форму квадратного изображения.
pub trait Augmentation: Send + Sync {
    /// Применяет преобразование. Случайность берется только из `rng`.
    fn apply(&self, image: Array3<f32>, rng: &mut dyn RngCore) -> Array3<f32>;

    /// Имя шага для логов.
    fn name(&self) -> &str;
}

/// Отражает изображение вдоль заданной оси.
pub fn mirror(image: ArrayView3<f32>, axis: MirrorAxis) -> Array3<f32> {
    match axis {
        MirrorAxis::Horizontal => image.slice(s![.., ..;-1, ..]).to_owned(),
        MirrorAxis::Vertical => image.slice(s![..;-1, .., ..]).to_owned(),
    }
}

/// Поворачивает изображение на `k * 90` градусов против часовой стрелки,
/// как `numpy.rot90(image, k)`.
pub fn rot90(image: ArrayView3<f32>, k: usize) -> Array3<f32> {
    match k % 4 {
        0 => image.to_owned(),
        1 => image.slice(s![.., ..;-1, ..]).permuted_axes([1, 0, 2]).to_owned(),
        2 => image.slice(s![..;-1, ..;-1, ..]).to_owned(),
        _ => {
            let transposed = image.permuted_axes([1, 0, 2]);
            transposed.slice(s![.., ..;-1, ..]).to_owned()
        }
    }
}

/// Отражение по случайно выбранной оси (равновероятно по горизонтали или вертикали).
#[derive(Debug, Clone, Default)]
pub struct RandomMirror;

impl Augmentation for RandomMirror {
    fn apply(&self, image: Array3<f32>, rng: &mut dyn RngCore) -> Array3<f32> {
        let axis = if rng.random_bool(0.5) {
            MirrorAxis::Horizontal
        } else {
            MirrorAxis::Vertical
        };
        mirror(image.view(), axis)
    }

    fn name(&self) -> &str {
        "random_mirror"
    }
}

/// Поворот на 90, 180 или 270 градусов, выбранный равновероятно.
/// Нулевой поворот не выбирается.
#[derive(Debug, Clone, Default)]
pub struct RandomRotation;

impl Augmentation for RandomRotation {
    fn apply(&self, image: Array3<f32>, rng: &mut dyn RngCore) -> Array3<f32> {
        let k = rng.random_range(1..=3usize);
        rot90(image.view(), k)
    }

    fn name(&self) -> &str {
        "random_rotation"
    }
}

/// Билинейная интерполяция с центрами пикселей в `i + 0.5`, без сглаживания.
///
/// Если размеры уже совпадают, изображение возвращается как есть.
pub fn resize_bilinear(image: Array3<f32>, out_h: usize, out_w: usize) -> Array3<f32> {
    let (in_h, in_w, channels) = image.dim();
    if (in_h, in_w) == (out_h, out_w) {
        return image;
    }

    let scale_y = in_h as f32 / out_h as f32;
    let scale_x = in_w as f32 / out_w as f32;

    Array3::from_shape_fn((out_h, out_w, channels), |(y, x, c)| {
        let (y0, y1, dy) = source_coord(y, scale_y, in_h);
        let (x0, x1, dx) = source_coord(x, scale_x, in_w);

        let top = image[[y0, x0, c]] * (1.0 - dx) + image[[y0, x1, c]] * dx;
        let bottom = image[[y1, x0, c]] * (1.0 - dx) + image[[y1, x1, c]] * dx;
        top * (1.0 - dy) + bottom * dy
    })
}

/// Соседние исходные индексы и вес для координаты `dst` выходного изображения.
fn source_coord(dst: usize, scale: f32, len: usize) -> (usize, usize, f32) {
    let max = (len - 1) as f32;
    let src = ((dst as f32 + 0.5) * scale - 0.5).clamp(0.0, max);
    let lo = src.floor() as usize;
    let hi = (lo + 1).min(len - 1);
    (lo, hi, src - lo as f32)
}

/// Приводит число каналов: один канал размножается, несколько каналов
/// усредняются в один. Остальные сочетания не поддерживаются.
fn adapt_channels(image: Array3<f32>, channels: usize) -> Option<Array3<f32>> {
    let (h, w, c) = image.dim();
    if c == channels {
        Some(image)
    } else if c == 1 {
        image.broadcast((h, w, channels)).map(|v| v.to_owned())
    } else if channels == 1 {
        image
            .mean_axis(Axis(2))
            .map(|gray| gray.insert_axis(Axis(2)))
    } else {
        None
    }
}

/// Конвейер аугментации: resize, затем включенные случайные шаги.
pub struct AugmentationPipeline {
    target: TargetShape,
    steps: Vec<Box<dyn Augmentation>>,
}

impl AugmentationPipeline {
    /// Создает конвейер для целевой формы.
    ///
    /// Поворот на 90/270 градусов меняет местами высоту и ширину, поэтому
    /// с поворотом допускается только квадратная форма.
    pub fn new(target: TargetShape, mirroring: bool, rotation: bool) -> Result<Self> {
        if rotation && !target.is_square() {
            return Err(DataError::InvalidShape {
                shape: target.dims(),
                reason: "поворот требует квадратной формы (H == W)".to_string(),
            });
        }

        let mut steps: Vec<Box<dyn Augmentation>> = Vec::new();
        if mirroring {
            steps.push(Box::new(RandomMirror));
        }
        if rotation {
            steps.push(Box::new(RandomRotation));
        }

        Ok(Self { target, steps })
    }

    pub fn target(&self) -> TargetShape {
        self.target
    }

    /// Имена включенных случайных шагов.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Преобразует сырой образец в массив целевой формы. Вход не изменяется.
    pub fn transform(
        &self,
        id: &str,
        raw: &ArrayD<f32>,
        rng: &mut dyn RngCore,
    ) -> Result<ArrayD<f32>> {
        let mut image = self.resize(id, raw)?;
        for step in &self.steps {
            image = step.apply(image, rng);
        }

        Ok(match self.target {
            TargetShape::Gray { .. } => image.index_axis_move(Axis(2), 0).into_dyn(),
            TargetShape::Color { .. } => image.into_dyn(),
        })
    }

    /// Шаг изменения размера: выполняется всегда, когда формы различаются.
    fn resize(&self, id: &str, raw: &ArrayD<f32>) -> Result<Array3<f32>> {
        let shape_err = || DataError::SampleShape {
            id: id.to_string(),
            shape: raw.shape().to_vec(),
            target: self.target.dims(),
        };

        let image: Array3<f32> = match raw.ndim() {
            2 => raw
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|_| shape_err())?
                .insert_axis(Axis(2))
                .to_owned(),
            3 => raw
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|_| shape_err())?
                .to_owned(),
            _ => return Err(shape_err()),
        };

        let (h, w, _) = image.dim();
        if h == 0 || w == 0 {
            return Err(shape_err());
        }

        let image = adapt_channels(image, self.target.channels()).ok_or_else(shape_err)?;
        Ok(resize_bilinear(
            image,
            self.target.height(),
            self.target.width(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid(h: usize, w: usize) -> Array3<f32> {
        Array3::from_shape_fn((h, w, 1), |(y, x, _)| (y * w + x) as f32)
    }

    #[test]
    fn test_mirror_axes() {
        let img = grid(2, 3);
        let h = mirror(img.view(), MirrorAxis::Horizontal);
        let v = mirror(img.view(), MirrorAxis::Vertical);
        // Исходное: [[0,1,2],[3,4,5]]
        assert_eq!(h.index_axis(Axis(2), 0), array![[2.0f32, 1.0, 0.0], [5.0, 4.0, 3.0]]);
        assert_eq!(v.index_axis(Axis(2), 0), array![[3.0f32, 4.0, 5.0], [0.0, 1.0, 2.0]]);
    }

    #[test]
    fn test_rot90_matches_numpy() {
        // numpy.rot90([[0,1],[2,3]]) == [[1,3],[0,2]]
        let img = grid(2, 2);
        let r1 = rot90(img.view(), 1);
        let r2 = rot90(img.view(), 2);
        let r3 = rot90(img.view(), 3);
        assert_eq!(r1.index_axis(Axis(2), 0), array![[1.0f32, 3.0], [0.0, 2.0]]);
        assert_eq!(r2.index_axis(Axis(2), 0), array![[3.0f32, 2.0], [1.0, 0.0]]);
        assert_eq!(r3.index_axis(Axis(2), 0), array![[2.0f32, 0.0], [3.0, 1.0]]);
        assert_eq!(rot90(r1.view(), 3), img);
    }

    #[test]
    fn test_rot90_non_square_swaps_dims() {
        let img = grid(2, 3);
        assert_eq!(rot90(img.view(), 1).dim(), (3, 2, 1));
    }

    #[test]
    fn test_resize_identity() {
        let img = grid(4, 4);
        assert_eq!(resize_bilinear(img.clone(), 4, 4), img);
    }

    #[test]
    fn test_resize_constant_image() {
        let img = Array3::from_elem((5, 7, 3), 42.0f32);
        let out = resize_bilinear(img, 3, 2);
        assert_eq!(out.dim(), (3, 2, 3));
        assert!(out.iter().all(|&v| (v - 42.0).abs() < 1e-5));
    }

    #[test]
    fn test_resize_upsample_keeps_range() {
        let img = grid(2, 2);
        let out = resize_bilinear(img, 4, 4);
        assert_eq!(out[[0, 0, 0]], 0.0);
        assert_eq!(out[[3, 3, 0]], 3.0);
        assert!(out.iter().all(|&v| (0.0..=3.0).contains(&v)));
    }

    #[test]
    fn test_no_augmentation_is_identity() {
        let target = TargetShape::from_dims(&[3, 3, 2]).unwrap();
        let pipeline = AugmentationPipeline::new(target, false, false).unwrap();
        let raw = ArrayD::from_shape_fn(IxDyn(&[3, 3, 2]), |ix| (ix[0] * 10 + ix[1] + ix[2]) as f32);
        let mut rng = StdRng::seed_from_u64(0);

        let out = pipeline.transform("s", &raw, &mut rng).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_gray_to_color_and_back() {
        let mut rng = StdRng::seed_from_u64(0);
        let raw = ArrayD::from_elem(IxDyn(&[4, 4]), 7.0f32);

        let color = AugmentationPipeline::new(TargetShape::from_dims(&[2, 2, 3]).unwrap(), false, false)
            .unwrap()
            .transform("g", &raw, &mut rng)
            .unwrap();
        assert_eq!(color.shape(), &[2, 2, 3]);

        let gray = AugmentationPipeline::new(TargetShape::from_dims(&[2, 2]).unwrap(), false, false)
            .unwrap()
            .transform("c", &color, &mut rng)
            .unwrap();
        assert_eq!(gray.shape(), &[2, 2]);
        assert!(gray.iter().all(|&v| (v - 7.0).abs() < 1e-5));
    }

    #[test]
    fn test_channel_mismatch_is_sample_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let pipeline =
            AugmentationPipeline::new(TargetShape::from_dims(&[2, 2, 3]).unwrap(), false, false).unwrap();
        let raw = ArrayD::zeros(IxDyn(&[2, 2, 4]));
        assert!(matches!(
            pipeline.transform("bad", &raw, &mut rng),
            Err(DataError::SampleShape { .. })
        ));
    }

    #[test]
    fn test_rotation_requires_square_target() {
        let target = TargetShape::from_dims(&[4, 8, 3]).unwrap();
        assert!(matches!(
            AugmentationPipeline::new(target, false, true),
            Err(DataError::InvalidShape { .. })
        ));
        assert!(AugmentationPipeline::new(target, true, false).is_ok());
    }

    #[test]
    fn test_random_steps_produce_known_variants() {
        let img = grid(3, 3);
        let mirrors = [
            mirror(img.view(), MirrorAxis::Horizontal),
            mirror(img.view(), MirrorAxis::Vertical),
        ];
        let rotations = [rot90(img.view(), 1), rot90(img.view(), 2), rot90(img.view(), 3)];

        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_mirrors = [false; 2];
        let mut seen_rotations = [false; 3];
        for _ in 0..200 {
            let m = RandomMirror.apply(img.clone(), &mut rng);
            let i = mirrors.iter().position(|v| *v == m).expect("unexpected mirror output");
            seen_mirrors[i] = true;

            let r = RandomRotation.apply(img.clone(), &mut rng);
            let j = rotations.iter().position(|v| *v == r).expect("unexpected rotation output");
            seen_rotations[j] = true;
        }
        assert!(seen_mirrors.iter().all(|&s| s));
        assert!(seen_rotations.iter().all(|&s| s));
    }

    #[test]
    fn test_input_not_mutated() {
        let target = TargetShape::from_dims(&[3, 3]).unwrap();
        let pipeline = AugmentationPipeline::new(target, true, true).unwrap();
        let raw = ArrayD::from_shape_fn(IxDyn(&[3, 3]), |ix| (ix[0] * 3 + ix[1]) as f32);
        let copy = raw.clone();
        let mut rng = StdRng::seed_from_u64(1);

        let out = pipeline.transform("s", &raw, &mut rng).unwrap();
        assert_eq!(raw, copy);
        assert_eq!(out.shape(), &[3, 3]);
        assert_eq!(pipeline.step_names(), vec!["random_mirror", "random_rotation"]);
    }
}
