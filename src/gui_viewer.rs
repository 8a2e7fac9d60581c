//! Просмотр батчей в окне egui: сетка изображений с именами классов.

use crate::data::{Batch, BatchIterator, LabelCatalog, SampleStore};
use crate::vis::{array_to_rgb, VisError};
use eframe::egui;

const DEFAULT_ZOOM: f32 = 3.0;

/// GUI-приложение для просмотра батчей.
///
/// Только читает батчи: кнопка "Следующий батч" вызывает
/// `produce_next_batch`, как это сделал бы цикл обучения.
pub struct BatchViewerApp<S: SampleStore> {
    batches: BatchIterator<S>,
    cols: usize,
    zoom: f32,
    tiles: Vec<(egui::TextureHandle, String)>,
    status: String,
    needs_batch: bool,
}

impl<S: SampleStore> BatchViewerApp<S> {
    pub fn new(cc: &eframe::CreationContext<'_>, batches: BatchIterator<S>, cols: usize) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            batches,
            cols: cols.max(1),
            zoom: DEFAULT_ZOOM,
            tiles: Vec::new(),
            status: String::new(),
            needs_batch: true,
        }
    }

    fn load_next(&mut self, ctx: &egui::Context) {
        let result = self
            .batches
            .produce_next_batch()
            .map_err(VisError::from)
            .and_then(|batch| upload_batch(ctx, &batch, self.batches.catalog()));

        match result {
            Ok(tiles) => {
                self.status = format!("Батч из {} изображений", tiles.len());
                self.tiles = tiles;
            }
            Err(e) => self.status = format!("Ошибка: {}", e),
        }
    }
}

/// Загружает изображения батча в текстуры.
fn upload_batch(
    ctx: &egui::Context,
    batch: &Batch,
    catalog: &LabelCatalog,
) -> Result<Vec<(egui::TextureHandle, String)>, VisError> {
    let mut tiles = Vec::with_capacity(batch.len());
    for (i, &label) in batch.labels.iter().enumerate() {
        let rgb = array_to_rgb(batch.image(i))?;
        let (w, h) = rgb.dimensions();
        let color = egui::ColorImage::from_rgb([w as usize, h as usize], rgb.as_raw());
        let texture = ctx.load_texture(format!("sample_{}", i), color, egui::TextureOptions::NEAREST);
        let title = catalog.class_name(label)?.to_string();
        tiles.push((texture, title));
    }
    Ok(tiles)
}

impl<S: SampleStore + 'static> eframe::App for BatchViewerApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.needs_batch {
            self.needs_batch = false;
            self.load_next(ctx);
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Следующий батч").clicked() {
                    self.needs_batch = true;
                }
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=8.0).text("масштаб"));
                ui.label(format!("Эпоха: {}", self.batches.current_epoch()));
                ui.label(self.status.as_str());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                egui::Grid::new("batch_grid")
                    .spacing([12.0, 12.0])
                    .show(ui, |ui| {
                        for (i, (texture, title)) in self.tiles.iter().enumerate() {
                            ui.vertical(|ui| {
                                ui.label(title.as_str());
                                ui.image((texture.id(), texture.size_vec2() * self.zoom));
                            });
                            if (i + 1) % self.cols == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });
        });

        if self.needs_batch {
            ctx.request_repaint();
        }
    }
}

/// Открывает окно просмотра. Блокирует поток до закрытия окна.
pub fn run_viewer<S: SampleStore + 'static>(
    batches: BatchIterator<S>,
    cols: usize,
) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([960.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "RustyBatch - просмотр батчей",
        options,
        Box::new(move |cc| Ok(Box::new(BatchViewerApp::new(cc, batches, cols)))),
    )
}
