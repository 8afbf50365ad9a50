//! Per-folder cropping session: the image list, the image on screen, its
//! view and candidate boxes, and the status shown to the operator.

use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui::{Pos2, Vec2};
use image::DynamicImage;

use crate::config::CropperConfig;
use crate::detection::{FaceDetector, candidates_from};
use crate::error::{CropError, Result};
use crate::export::{ExportOptions, export_crop};
use crate::geometry::ViewState;
use crate::interaction::{self, Interaction};
use crate::selection::{Selection, default_candidate};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Image files directly inside `folder`, in directory-listing order.
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_image && path.is_file() {
            images.push(path);
        }
    }
    Ok(images)
}

#[derive(Debug)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

pub struct CropSession {
    config: CropperConfig,
    detector: Box<dyn FaceDetector>,
    images: Vec<PathBuf>,
    index: usize,
    current: Option<LoadedImage>,
    /// Bumped every time `current` changes, so the UI knows to re-upload its texture.
    generation: u64,
    view: ViewState,
    selection: Selection,
    interaction: Interaction,
    canvas_size: Vec2,
    status: String,
}

impl CropSession {
    pub fn new(config: CropperConfig, detector: Box<dyn FaceDetector>) -> Self {
        let selection = Selection::new(config.min_box_size);
        Self {
            config,
            detector,
            images: Vec::new(),
            index: 0,
            current: None,
            generation: 0,
            view: ViewState::default(),
            selection,
            interaction: Interaction::default(),
            canvas_size: Vec2::new(800.0, 800.0),
            status: "No folder selected".to_owned(),
        }
    }

    pub fn config(&self) -> &CropperConfig {
        &self.config
    }

    pub fn set_sharpen(&mut self, sharpen: bool) {
        self.config.sharpen = sharpen;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&LoadedImage> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        self.canvas_size = size;
    }

    pub fn can_export(&self) -> bool {
        self.current.is_some() && self.selection.selected_box().is_some()
    }

    pub fn is_finished(&self) -> bool {
        !self.images.is_empty() && self.index >= self.images.len()
    }

    /// Lists `folder` and loads its first image. An empty folder is not an error.
    pub fn open_folder(&mut self, folder: &Path) -> Result<()> {
        let images = list_images(folder)?;
        log::info!("Opened {}: {} images", folder.display(), images.len());

        self.images = images;
        self.index = 0;
        self.set_current(None);
        if self.images.is_empty() {
            self.status = "No images found in selected folder.".to_owned();
            return Ok(());
        }

        fs::create_dir_all(&self.config.output_dir)?;
        self.load_current();
        Ok(())
    }

    /// Loads the image at `index`, skipping files that fail to decode.
    fn load_current(&mut self) {
        while let Some(path) = self.images.get(self.index).cloned() {
            match image::open(&path) {
                Ok(image) => {
                    log::info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
                    self.view.reset();
                    self.set_current(Some(LoadedImage { path, image }));
                    self.seed_candidates();
                    self.status = format!("{} images loaded.", self.images.len());
                    return;
                }
                Err(err) => {
                    log::warn!("Skipping {}: {err}", path.display());
                    self.index += 1;
                }
            }
        }
        self.set_current(None);
        self.status = "All images processed!".to_owned();
    }

    fn set_current(&mut self, current: Option<LoadedImage>) {
        self.current = current;
        self.generation += 1;
        self.interaction = Interaction::Idle;
        self.selection.clear();
    }

    fn seed_candidates(&mut self) {
        let Some(current) = &self.current else {
            return;
        };
        let detections = match self.detector.predict(&current.path) {
            Ok(detections) => detections,
            Err(err) => {
                log::warn!("Face detection failed for {}: {err}", current.path.display());
                Vec::new()
            }
        };

        if detections.is_empty() {
            log::info!("No face detected.");
            let fallback = default_candidate(&self.view, self.canvas_size, self.config.default_box_size);
            self.selection.set_candidates(vec![fallback]);
        } else {
            log::info!("{} faces detected", detections.len());
            self.selection
                .set_candidates(candidates_from(&detections, self.config.padding));
        }
    }

    /// Writes the selected crop as `cropped_<index + 1>.png`, then moves on.
    pub fn export(&mut self) -> Result<PathBuf> {
        let current = self.current.as_ref().ok_or(CropError::NoImage)?;
        let rect = self.selection.selected_box().ok_or(CropError::NoSelection)?;
        let options = ExportOptions {
            output_dir: self.config.output_dir.clone(),
            output_size: self.config.output_size,
            sharpen: self.config.sharpen,
        };
        let path = export_crop(&current.image, rect, &options, self.index + 1)?;

        self.index += 1;
        self.load_current();
        if !self.is_finished() {
            self.status = format!(
                "Saved {} ({}/{})",
                path.display(),
                self.index,
                self.images.len()
            );
        }
        Ok(path)
    }

    pub fn pointer_down(&mut self, pos: Pos2) {
        self.interaction
            .pointer_down(pos, &self.view, &self.selection, self.config.handle_radius);
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        self.interaction
            .pointer_move(pos, &mut self.view, &mut self.selection);
    }

    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    pub fn click(&mut self, pos: Pos2) -> bool {
        self.interaction.click(pos, &self.view, &mut self.selection)
    }

    pub fn scroll(&mut self, delta: f32) {
        interaction::scroll(&mut self.view, delta, self.config.zoom_factor);
    }

    pub fn select_next(&mut self) {
        if self.interaction.is_idle() {
            self.selection.select_next();
        }
    }

    /// Pans so the selected box sits in the middle of the canvas.
    pub fn center_on_selection(&mut self) {
        if let Some(rect) = self.selection.selected_box() {
            self.view.center_on(rect.center(), self.canvas_size);
        }
    }
}
