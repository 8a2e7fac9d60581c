//! # Модуль загрузки данных
//!
//! Генератор батчей изображений для обучения: `.npy`-файлы на диске и
//! JSON с метками превращаются в бесконечный поток батчей фиксированного
//! размера с учетом эпох, перемешиванием и аугментацией.
//!
//! ## Основные компоненты
//!
//! - [`LabelCatalog`]: метки образцов и имена классов
//! - [`SampleStore`]: источник сырых образцов ([`NpyDirectoryStore`], [`InMemoryStore`])
//! - [`AugmentationPipeline`]: resize, случайное отражение и поворот
//! - [`EpochSampler`]: перестановка, курсор и счетчик эпох
//! - [`BatchIterator`]: сборка батчей
//!
//! ## Пример
//!
//! ```rust,ignore
//! use rustybatch::data::{BatchIterator, GeneratorConfig};
//!
//! let config = GeneratorConfig::default()
//!     .batch_size(10)
//!     .shuffle(true)
//!     .mirroring(true)
//!     .rotation(true);
//! let mut batches = BatchIterator::from_config(&config)?;
//!
//! for _ in 0..100 {
//!     let batch = batches.produce_next_batch()?;
//!     // Обучение на батче
//! }
//! println!("Эпох пройдено: {}", batches.current_epoch());
//! ```

pub mod augment;
pub mod catalog;
pub mod config;
pub mod error;
pub mod iterator;
pub mod sampler;
pub mod shape;
pub mod store;

pub use augment::{Augmentation, AugmentationPipeline, MirrorAxis, RandomMirror, RandomRotation};
pub use catalog::{Label, LabelCatalog, SampleId, CIFAR10_CLASSES};
pub use config::GeneratorConfig;
pub use error::{DataError, Result};
pub use iterator::{Batch, BatchIterator};
pub use sampler::{EpochSampler, SamplerState};
pub use shape::TargetShape;
pub use store::{InMemoryStore, NpyDirectoryStore, SampleStore};
