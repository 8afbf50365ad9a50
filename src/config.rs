use std::path::PathBuf;

/// Asymmetric padding applied around a detected face, in multiples of the
/// detected box height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaddingPolicy {
    /// Left and top.
    pub leading: f32,
    /// Right and bottom.
    pub trailing: f32,
}

impl Default for PaddingPolicy {
    fn default() -> Self {
        Self {
            leading: 1.8,
            trailing: 1.0,
        }
    }
}

/// Tunables for detection, interaction and export.
#[derive(Clone, Debug)]
pub struct CropperConfig {
    /// Edge length of every exported file.
    pub output_size: u32,
    /// Edge length, in canvas pixels, of the fallback box used when nothing is detected.
    pub default_box_size: f32,
    /// Smallest accepted box edge, in image pixels.
    pub min_box_size: f32,
    pub zoom_factor: f32,
    /// Hit tolerance around a corner glyph, in canvas pixels.
    pub handle_radius: f32,
    pub padding: PaddingPolicy,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub model_input_size: u32,
    pub model_file: PathBuf,
    pub output_dir: PathBuf,
    pub sharpen: bool,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            output_size: 1024,
            default_box_size: 512.0,
            min_box_size: 20.0,
            zoom_factor: 1.1,
            handle_radius: 10.0,
            padding: PaddingPolicy::default(),
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            model_input_size: 640,
            model_file: PathBuf::from("face_yolov8m.onnx"),
            output_dir: PathBuf::from("output"),
            sharpen: false,
        }
    }
}

impl CropperConfig {
    /// Model location resolved against the working directory.
    pub fn model_path(&self) -> std::io::Result<PathBuf> {
        Ok(std::env::current_dir()?.join(&self.model_file))
    }
}
