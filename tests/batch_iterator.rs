// Сквозные тесты генератора батчей на настоящих `.npy` файлах.

use ndarray::{Array3, ArrayD, Axis};
use ndarray_npy::write_npy;
use rustybatch::data::augment::{mirror, rot90};
use rustybatch::data::{BatchIterator, DataError, GeneratorConfig, MirrorAxis, SamplerState};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Изображение 4x4x3 с уникальными значениями; `n` сдвигает значения.
fn sample_image(n: usize) -> Array3<u8> {
    Array3::from_shape_fn((4, 4, 3), |(y, x, c)| (n * 20 + y * 12 + x * 3 + c) as u8)
}

/// Создает датасет `s0..s{n-1}` с метками `i % 10` и возвращает конфигурацию.
fn write_dataset(dir: &Path, n: usize) -> GeneratorConfig {
    let data_dir = dir.join("images");
    fs::create_dir(&data_dir).unwrap();

    let mut labels = HashMap::new();
    for i in 0..n {
        write_npy(data_dir.join(format!("s{}.npy", i)), &sample_image(i)).unwrap();
        labels.insert(format!("s{}", i), i % 10);
    }
    // Посторонний файл должен игнорироваться
    fs::write(data_dir.join("README.txt"), "not a sample").unwrap();

    let label_file = dir.join("labels.json");
    fs::write(&label_file, serde_json::to_string(&labels).unwrap()).unwrap();

    let mut config = GeneratorConfig::default()
        .batch_size(3)
        .image_shape(vec![4, 4, 3])
        .seed(11);
    config.data_dir = data_dir;
    config.label_file = label_file;
    config
}

fn ids(batch: &rustybatch::data::Batch) -> Vec<String> {
    batch.ids.clone()
}

#[test]
fn test_directory_epochs_without_shuffle() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 7);
    let mut batches = BatchIterator::from_config(&config).unwrap();

    assert_eq!(batches.dataset_len(), 7);
    assert_eq!(ids(&batches.produce_next_batch().unwrap()), ["s0", "s1", "s2"]);
    assert_eq!(ids(&batches.produce_next_batch().unwrap()), ["s3", "s4", "s5"]);
    assert_eq!(batches.current_epoch(), 0);

    let batch = batches.produce_next_batch().unwrap();
    assert_eq!(ids(&batch), ["s6", "s0", "s1"]);
    assert_eq!(batches.current_epoch(), 1);
    assert_eq!(batch.labels, vec![6, 0, 1]);
    assert_eq!(batch.images.shape(), &[3, 4, 4, 3]);

    // Без аугментации изображение совпадает с файлом
    let expected = sample_image(6).mapv(f32::from).into_dyn();
    assert_eq!(batch.image(0).to_owned(), expected);
}

#[test]
fn test_shuffled_epoch_visits_every_id_once() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 8).batch_size(4).shuffle(true);
    let mut batches = BatchIterator::from_config(&config).unwrap();

    for epoch in 0..3 {
        let mut seen = HashSet::new();
        for _ in 0..2 {
            for id in batches.produce_next_batch().unwrap().ids {
                assert!(seen.insert(id), "повтор внутри эпохи {}", epoch);
            }
        }
        assert_eq!(seen.len(), 8);
        assert_eq!(batches.state(), SamplerState::Exhausted);
    }
    assert_eq!(batches.current_epoch(), 2);
}

#[test]
fn test_same_seed_same_stream() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 5)
        .batch_size(4)
        .shuffle(true)
        .mirroring(true)
        .rotation(true);

    let first = BatchIterator::from_config(&config).unwrap();
    let second = BatchIterator::from_config(&config).unwrap();

    for (a, b) in first.zip(second).take(6) {
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.ids, b.ids);
        assert_eq!(a.images, b.images);
    }
}

#[test]
fn test_mirroring_is_one_of_two_flips() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 4).batch_size(8).mirroring(true);
    let mut batches = BatchIterator::from_config(&config).unwrap();

    let batch = batches.produce_next_batch().unwrap();
    for (i, id) in batch.ids.iter().enumerate() {
        let n: usize = id[1..].parse().unwrap();
        let source = sample_image(n).mapv(f32::from);
        let got = batch.images.index_axis(Axis(0), i).to_owned();

        let flips = [
            mirror(source.view(), MirrorAxis::Horizontal).into_dyn(),
            mirror(source.view(), MirrorAxis::Vertical).into_dyn(),
        ];
        assert!(flips.contains(&got), "образец {} не отражен", id);
    }
}

#[test]
fn test_rotation_is_never_identity() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 3).batch_size(9).rotation(true);
    let mut batches = BatchIterator::from_config(&config).unwrap();

    let batch = batches.produce_next_batch().unwrap();
    for (i, id) in batch.ids.iter().enumerate() {
        let n: usize = id[1..].parse().unwrap();
        let source = sample_image(n).mapv(f32::from);
        let got = batch.images.index_axis(Axis(0), i).to_owned();

        assert_ne!(got, source.clone().into_dyn());
        let rotations: Vec<ArrayD<f32>> =
            (1..=3).map(|k| rot90(source.view(), k).into_dyn()).collect();
        assert!(rotations.contains(&got));
    }
}

#[test]
fn test_resize_to_gray_target() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 2).image_shape(vec![2, 2]);
    let mut batches = BatchIterator::from_config(&config).unwrap();

    let batch = batches.produce_next_batch().unwrap();
    assert_eq!(batch.images.shape(), &[3, 2, 2]);
    assert!(batch.images.iter().all(|v| v.is_finite()));
}

#[test]
fn test_failed_batch_leaves_state_untouched() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 5).batch_size(2);
    let broken = config.data_dir.join("s3.npy");
    fs::write(&broken, b"definitely not npy").unwrap();

    let mut batches = BatchIterator::from_config(&config).unwrap();
    assert_eq!(ids(&batches.produce_next_batch().unwrap()), ["s0", "s1"]);

    for _ in 0..2 {
        let err = batches.produce_next_batch().unwrap_err();
        assert!(matches!(err, DataError::SampleLoad { ref id, .. } if id == "s3"));
        assert_eq!(batches.cursor(), 2);
        assert_eq!(batches.current_epoch(), 0);
    }

    // После исправления файла батч собирается с того же места
    write_npy(&broken, &sample_image(3)).unwrap();
    assert_eq!(ids(&batches.produce_next_batch().unwrap()), ["s2", "s3"]);
    assert_eq!(ids(&batches.produce_next_batch().unwrap()), ["s4", "s0"]);
    assert_eq!(batches.current_epoch(), 1);
}

#[test]
fn test_configuration_errors() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 3);

    let err = BatchIterator::from_config(&config.clone().image_shape(vec![4, 6]).rotation(true))
        .err()
        .unwrap();
    assert!(matches!(err, DataError::InvalidShape { .. }));
    assert!(err.is_configuration());

    let mut missing = config.clone();
    missing.label_file = dir.path().join("nope.json");
    let err = BatchIterator::from_config(&missing).err().unwrap();
    assert!(matches!(err, DataError::LabelSource { .. }));

    let mut no_dir = config;
    no_dir.data_dir = dir.path().join("nope");
    let err = BatchIterator::from_config(&no_dir).err().unwrap();
    assert!(matches!(err, DataError::SampleDirectory { .. }));
}

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = write_dataset(dir.path(), 4).shuffle(true).mirroring(true);
    let path = dir.path().join("config.json");
    config.save_json_file(&path).unwrap();

    let loaded = GeneratorConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);

    let mut batches = BatchIterator::from_config(&loaded).unwrap();
    let batch = batches.produce_next_batch().unwrap();
    let names: Vec<&str> = batch
        .labels
        .iter()
        .map(|&l| batches.class_name(l).unwrap())
        .collect();
    assert_eq!(names.len(), 3);
}
