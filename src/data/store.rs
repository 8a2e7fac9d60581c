// --- Файл: src/data/store.rs ---

//! Хранилища образцов: трейт `SampleStore` и его реализации.

use super::catalog::SampleId;
use super::error::{DataError, Result};
use ndarray::ArrayD;
use ndarray_npy::ReadNpyExt;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Источник сырых образцов.
///
/// Хранилище должно уметь:
/// - Перечислять идентификаторы в стабильном порядке
/// - Загружать массив образца по идентификатору
pub trait SampleStore: Send + Sync {
    /// Идентификаторы в детерминированном (лексикографическом) порядке.
    fn list_ids(&self) -> &[SampleId];

    /// Загружает образец формы (H, W) или (H, W, C).
    fn load(&self, id: &str) -> Result<ArrayD<f32>>;

    /// Возвращает количество образцов.
    fn len(&self) -> usize {
        self.list_ids().len()
    }

    /// Проверяет, пусто ли хранилище.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Директория с файлами `<id>.npy`.
#[derive(Debug, Clone)]
pub struct NpyDirectoryStore {
    root: PathBuf,
    ids: Vec<SampleId>,
}

impl NpyDirectoryStore {
    /// Сканирует директорию один раз; файлы без расширения `.npy` пропускаются.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let dir_err = |source| DataError::SampleDirectory {
            path: root.clone(),
            source,
        };

        let mut ids = Vec::new();
        for entry in fs::read_dir(&root).map_err(dir_err)? {
            let path = entry.map_err(dir_err)?.path();
            let is_npy = path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("npy");
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_npy => ids.push(stem.to_string()),
                _ => log::debug!("Пропускаю {}", path.display()),
            }
        }
        ids.sort();

        log::info!("Найдено {} образцов в {}", ids.len(), root.display());
        Ok(Self { root, ids })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.npy", id))
    }
}

/// Читает `.npy` любого поддерживаемого типа и приводит к `f32` без масштабирования.
fn decode_npy(bytes: &[u8]) -> std::result::Result<ArrayD<f32>, String> {
    if let Ok(a) = ArrayD::<u8>::read_npy(bytes) {
        return Ok(a.mapv(f32::from));
    }
    if let Ok(a) = ArrayD::<f32>::read_npy(bytes) {
        return Ok(a);
    }
    if let Ok(a) = ArrayD::<f64>::read_npy(bytes) {
        return Ok(a.mapv(|x| x as f32));
    }
    ArrayD::<i64>::read_npy(bytes)
        .map(|a| a.mapv(|x| x as f32))
        .map_err(|e| e.to_string())
}

impl SampleStore for NpyDirectoryStore {
    fn list_ids(&self) -> &[SampleId] {
        &self.ids
    }

    fn load(&self, id: &str) -> Result<ArrayD<f32>> {
        let load_err = |reason: String| DataError::SampleLoad {
            id: id.to_string(),
            reason,
        };

        let bytes = fs::read(self.path_of(id)).map_err(|e| load_err(e.to_string()))?;
        let array = decode_npy(&bytes).map_err(load_err)?;

        match array.ndim() {
            2 | 3 => Ok(array),
            n => Err(load_err(format!("ожидалось 2 или 3 измерения, получено {}", n))),
        }
    }
}

/// Хранилище в памяти: удобно для тестов и синтетических данных.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    ids: Vec<SampleId>,
    samples: HashMap<SampleId, ArrayD<f32>>,
}

impl InMemoryStore {
    /// Создает хранилище из пар (идентификатор, массив).
    pub fn new<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (SampleId, ArrayD<f32>)>,
    {
        let samples: HashMap<SampleId, ArrayD<f32>> = samples.into_iter().collect();
        let mut ids: Vec<SampleId> = samples.keys().cloned().collect();
        ids.sort();
        Self { ids, samples }
    }
}

impl SampleStore for InMemoryStore {
    fn list_ids(&self) -> &[SampleId] {
        &self.ids
    }

    fn load(&self, id: &str) -> Result<ArrayD<f32>> {
        self.samples
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::SampleLoad {
                id: id.to_string(),
                reason: "образец отсутствует в хранилище".to_string(),
            })
    }
}
