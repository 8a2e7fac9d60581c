// --- Файл: src/data/iterator.rs ---

//! BatchIterator - бесконечный генератор батчей с учетом эпох.

use super::augment::AugmentationPipeline;
use super::catalog::{Label, LabelCatalog, SampleId};
use super::config::GeneratorConfig;
use super::error::{DataError, Result};
use super::sampler::{EpochSampler, SamplerState};
use super::shape::TargetShape;
use super::store::{NpyDirectoryStore, SampleStore};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Батч данных - изображения и метки, выровненные по индексу.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Изображения формы `[batch_size, ...target_shape]`
    pub images: ArrayD<f32>,
    /// Метки классов
    pub labels: Vec<Label>,
    /// Идентификаторы образцов в этом батче
    pub ids: Vec<SampleId>,
}

impl Batch {
    /// Создает новый батч.
    pub fn new(images: ArrayD<f32>, labels: Vec<Label>, ids: Vec<SampleId>) -> Self {
        Self {
            images,
            labels,
            ids,
        }
    }

    /// Возвращает размер батча.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Проверяет, пуст ли батч.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Изображение с индексом `index`.
    pub fn image(&self, index: usize) -> ArrayViewD<'_, f32> {
        self.images.index_axis(Axis(0), index)
    }
}

/// Бесконечный итератор по батчам.
///
/// Каждый вызов [`BatchIterator::produce_next_batch`] возвращает ровно
/// `batch_size` пар (изображение, метка) или ошибку. Если датасет
/// закончился посреди батча, батч дополняется началом следующей эпохи.
///
/// # Пример
///
/// ```rust,ignore
/// let config = GeneratorConfig::default().batch_size(10).shuffle(true);
/// let mut batches = BatchIterator::from_config(&config)?;
///
/// let batch = batches.produce_next_batch()?;
/// println!("epoch {}: {:?}", batches.current_epoch(), batch.labels);
/// ```
pub struct BatchIterator<S: SampleStore> {
    store: S,
    catalog: LabelCatalog,
    pipeline: AugmentationPipeline,
    sampler: EpochSampler,
    rng: StdRng,
    batch_size: usize,
    target: TargetShape,
}

impl BatchIterator<NpyDirectoryStore> {
    /// Открывает директорию с `.npy` и файл меток, указанные в конфигурации.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let store = NpyDirectoryStore::open(&config.data_dir)?;
        let catalog = LabelCatalog::from_json_file(&config.label_file)?;
        Self::new(store, catalog, config)
    }
}

impl<S: SampleStore> BatchIterator<S> {
    /// Создает итератор поверх готовых хранилища и каталога.
    ///
    /// Все ошибки конфигурации обнаруживаются здесь: неверный размер батча,
    /// неверная форма, пустой датасет и образцы без меток.
    pub fn new(store: S, catalog: LabelCatalog, config: &GeneratorConfig) -> Result<Self> {
        let target = config.validate()?;
        let pipeline = AugmentationPipeline::new(target, config.mirroring, config.rotation)?;

        if store.is_empty() {
            return Err(DataError::EmptyDataset(
                "хранилище не содержит ни одного образца".to_string(),
            ));
        }
        for id in store.list_ids() {
            catalog.label_of(id)?;
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let sampler = EpochSampler::new(store.len(), config.shuffle, &mut rng);

        log::info!(
            "BatchIterator: {} образцов, батч {}, форма {:?}, shuffle={}, шаги {:?}",
            store.len(),
            config.batch_size,
            target.dims(),
            config.shuffle,
            pipeline.step_names()
        );

        Ok(Self {
            store,
            catalog,
            pipeline,
            sampler,
            rng,
            batch_size: config.batch_size,
            target,
        })
    }

    /// Собирает следующий батч.
    ///
    /// Либо возвращает полный батч, либо ошибку; при ошибке курсор,
    /// эпоха, перестановка и генератор случайных чисел возвращаются к
    /// состоянию до вызова.
    pub fn produce_next_batch(&mut self) -> Result<Batch> {
        let rng_before = self.rng.clone();
        self.sampler.begin();

        match self.assemble() {
            Ok(batch) => {
                self.sampler.commit();
                Ok(batch)
            }
            Err(err) => {
                self.sampler.rollback();
                self.rng = rng_before;
                log::warn!("Батч не собран, состояние восстановлено: {}", err);
                Err(err)
            }
        }
    }

    fn assemble(&mut self) -> Result<Batch> {
        let mut shape = vec![self.batch_size];
        shape.extend(self.target.dims());
        let mut images = ArrayD::<f32>::zeros(IxDyn(&shape));
        let mut labels = Vec::with_capacity(self.batch_size);
        let mut ids = Vec::with_capacity(self.batch_size);

        for slot in 0..self.batch_size {
            let position = self
                .sampler
                .next_position(&mut self.rng)
                .ok_or_else(|| DataError::EmptyDataset("перестановка пуста".to_string()))?;
            let id = &self.store.list_ids()[position];

            let raw = self.store.load(id)?;
            let image = self.pipeline.transform(id, &raw, &mut self.rng)?;
            let label = self.catalog.label_of(id)?;

            images.index_axis_mut(Axis(0), slot).assign(&image);
            labels.push(label);
            ids.push(id.clone());
        }

        Ok(Batch::new(images, labels, ids))
    }

    /// Число завершенных проходов по датасету.
    pub fn current_epoch(&self) -> usize {
        self.sampler.epoch()
    }

    /// Имя класса по метке.
    pub fn class_name(&self, label: Label) -> Result<&str> {
        self.catalog.class_name(label)
    }

    /// Метка образца.
    pub fn label_of(&self, id: &str) -> Result<Label> {
        self.catalog.label_of(id)
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn target_shape(&self) -> TargetShape {
        self.target
    }

    /// Количество образцов в датасете.
    pub fn dataset_len(&self) -> usize {
        self.store.len()
    }

    /// Позиция курсора в текущей перестановке.
    pub fn cursor(&self) -> usize {
        self.sampler.cursor()
    }

    pub fn state(&self) -> SamplerState {
        self.sampler.state()
    }
}

impl<S: SampleStore> Iterator for BatchIterator<S> {
    type Item = Result<Batch>;

    /// Поток батчей бесконечен: `None` не возвращается никогда.
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.produce_next_batch())
    }
}
