//! # RustyBatch: генератор батчей изображений для обучения
//!
//! **RustyBatch** превращает директорию с файлами `<id>.npy` и JSON с метками
//! в бесконечный поток батчей фиксированного размера. Генератор ведет счет
//! эпох, умеет перемешивать порядок в каждой эпохе и применяет аугментации:
//! изменение размера, случайное отражение и поворот.
//!
//! ## Пример
//!
//! ```no_run
//! use rustybatch::data::{BatchIterator, GeneratorConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Описываем источник данных и параметры батчей
//!     let config = GeneratorConfig::default()
//!         .batch_size(12)
//!         .image_shape(vec![32, 32, 3])
//!         .shuffle(true)
//!         .mirroring(true);
//!
//!     // 2. Открываем датасет
//!     let mut batches = BatchIterator::from_config(&config)?;
//!
//!     // 3. Получаем батчи
//!     let batch = batches.produce_next_batch()?;
//!     assert_eq!(batch.images.shape(), &[12, 32, 32, 3]);
//!     println!("эпоха {}", batches.current_epoch());
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod gui_viewer;
pub mod patterns;
pub mod vis;
