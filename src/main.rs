//! Командная строка RustyBatch: выдача батчей и генерация тестовых узоров.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rustybatch::data::{BatchIterator, GeneratorConfig};
use rustybatch::gui_viewer::run_viewer;
use rustybatch::patterns::{Checker, Circle, Pattern, Spectrum};
use rustybatch::vis;
use std::path::{Path, PathBuf};

/// Аргументы командной строки
#[derive(Parser, Debug)]
#[command(author, version, about = "RustyBatch: генератор батчей изображений", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Выдать несколько батчей и показать их состав
    Batch(BatchArgs),
    /// Нарисовать тестовый узор и сохранить его в PNG
    Pattern(PatternArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON-файл конфигурации; флаги ниже его переопределяют
    #[arg(long)]
    config: Option<PathBuf>,

    /// Директория с файлами `<id>.npy`
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON-файл с метками
    #[arg(long)]
    labels: Option<PathBuf>,

    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Целевая форма, например `32,32,3` или `28,28`
    #[arg(long, value_delimiter = ',')]
    shape: Option<Vec<usize>>,

    #[arg(long)]
    shuffle: bool,

    #[arg(long)]
    mirroring: bool,

    #[arg(long)]
    rotation: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Сколько батчей выдать
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Сохранить сетку каждого батча в PNG
    #[arg(long)]
    save: Option<PathBuf>,

    /// Число столбцов сетки
    #[arg(long, default_value_t = 5)]
    cols: usize,

    /// Открыть окно просмотра батчей
    #[arg(short, long)]
    visualize: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PatternKind {
    Checker,
    Circle,
    Spectrum,
}

#[derive(Args, Debug)]
struct PatternArgs {
    #[arg(value_enum)]
    kind: PatternKind,

    /// Файл для сохранения (PNG)
    #[arg(short, long)]
    out: PathBuf,

    #[arg(short, long, default_value_t = 256)]
    resolution: usize,

    /// Размер клетки шахматной доски
    #[arg(long, default_value_t = 32)]
    tile_size: usize,

    /// Радиус круга
    #[arg(long, default_value_t = 64.0)]
    radius: f32,

    /// Центр круга по x (столбец); по умолчанию середина
    #[arg(long)]
    cx: Option<f32>,

    /// Центр круга по y (строка); по умолчанию середина
    #[arg(long)]
    cy: Option<f32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Batch(args) => run_batch(args),
        Command::Pattern(args) => run_pattern(args),
    }
}

/// Собирает конфигурацию из файла и флагов.
fn build_config(args: &BatchArgs) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(labels) = &args.labels {
        config.label_file = labels.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config = config.batch_size(batch_size);
    }
    if let Some(shape) = &args.shape {
        config = config.image_shape(shape.clone());
    }
    if let Some(seed) = args.seed {
        config = config.seed(seed);
    }
    config.shuffle |= args.shuffle;
    config.mirroring |= args.mirroring;
    config.rotation |= args.rotation;
    Ok(config)
}

fn run_batch(args: BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    let mut batches = BatchIterator::from_config(&config)?;
    println!(
        "[Config] {} образцов, батч {}, форма {:?}",
        batches.dataset_len(),
        batches.batch_size(),
        batches.target_shape().dims()
    );

    if args.visualize {
        run_viewer(batches, args.cols)?;
        return Ok(());
    }

    for i in 0..args.count {
        let batch = batches.produce_next_batch()?;
        let names = batch
            .labels
            .iter()
            .map(|&label| batches.class_name(label))
            .collect::<Result<Vec<_>, _>>()?;
        println!(
            "[Батч {}] эпоха {}, курсор {}: {:?}",
            i,
            batches.current_epoch(),
            batches.cursor(),
            names
        );

        if let Some(path) = &args.save {
            let path = numbered_path(path, i, args.count);
            vis::save_batch_grid(&batch, batches.catalog(), args.cols, &path)?;
            println!("  сохранено в {}", path.display());
        }
    }
    Ok(())
}

fn run_pattern(args: PatternArgs) -> Result<(), Box<dyn std::error::Error>> {
    let res = args.resolution;
    let pattern: Box<dyn Pattern> = match args.kind {
        PatternKind::Checker => Box::new(Checker::new(res, args.tile_size)?),
        PatternKind::Circle => {
            let middle = res as f32 / 2.0;
            let center = (args.cx.unwrap_or(middle), args.cy.unwrap_or(middle));
            Box::new(Circle::new(res, args.radius, center)?)
        }
        PatternKind::Spectrum => Box::new(Spectrum::new(res)?),
    };

    vis::save_array(pattern.draw().view(), &args.out)?;
    println!("[{}] сохранено в {}", pattern.name(), args.out.display());
    Ok(())
}

/// `grid.png` -> `grid_3.png`, если батчей больше одного.
fn numbered_path(path: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    path.with_file_name(format!("{}_{}.{}", stem, index, ext))
}
