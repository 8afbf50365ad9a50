//! Face detection and turning detections into crop candidates.
//!
//! The model is a YOLOv8 face detector exported to ONNX and run with
//! `tract-onnx`. Everything downstream only needs [`FaceDetector::predict`],
//! so tests and other backends can plug in their own implementation.

use std::path::Path;

use eframe::egui::{Rect, Vec2};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use tract_onnx::prelude::*;

use crate::config::{CropperConfig, PaddingPolicy};
use crate::error::{CropError, Result};

/// A raw detection in image pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
}

impl Detection {
    pub fn rect(&self) -> Rect {
        Rect::from_min_max(
            eframe::egui::pos2(self.x1, self.y1),
            eframe::egui::pos2(self.x2, self.y2),
        )
    }
}

pub trait FaceDetector {
    /// Detections for the image at `path`, most confident first, already
    /// filtered by the detector's confidence threshold.
    fn predict(&self, path: &Path) -> Result<Vec<Detection>>;
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct YoloFaceDetector {
    plan: OnnxPlan,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
}

impl std::fmt::Debug for YoloFaceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloFaceDetector")
            .field("input_size", &self.input_size)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .finish()
    }
}

impl YoloFaceDetector {
    pub fn load<P: AsRef<Path>>(model_path: P, config: &CropperConfig) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.is_file() {
            return Err(CropError::ModelNotFound(model_path.to_path_buf()));
        }

        let size = config.model_input_size as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(model_error)?;
        log::info!("Loaded face detection model from {}", model_path.display());

        Ok(Self {
            plan,
            input_size: config.model_input_size,
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
        })
    }

    pub fn detect_image(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (input, letterbox) = letterbox(image, self.input_size);
        let size = self.input_size as usize;
        let tensor: Tensor = tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
            input.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        })
        .into();

        let outputs = self.plan.run(tvec!(tensor.into())).map_err(model_error)?;
        let output = outputs[0]
            .to_array_view::<f32>()
            .map_err(model_error)?
            .into_dimensionality::<tract_ndarray::Ix3>()
            .map_err(|e| CropError::Model(e.to_string()))?;

        // YOLOv8 exports [1, 4 + classes, anchors]; some tools transpose it.
        let shape = output.shape();
        let transposed = shape[1] > shape[2];
        let (attributes, anchors) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if attributes < 5 {
            return Err(CropError::Model(format!(
                "unexpected output shape {shape:?}"
            )));
        }
        let at = |a: usize, i: usize| {
            if transposed {
                output[[0, i, a]]
            } else {
                output[[0, a, i]]
            }
        };

        let mut raw = Vec::new();
        for i in 0..anchors {
            let confidence = (4..attributes)
                .map(|a| at(a, i))
                .fold(f32::NEG_INFINITY, f32::max);
            if confidence < self.confidence_threshold {
                continue;
            }
            let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
            raw.push(letterbox.unmap(Detection {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
                confidence,
            }));
        }

        Ok(non_max_suppression(raw, self.iou_threshold))
    }
}

impl FaceDetector for YoloFaceDetector {
    fn predict(&self, path: &Path) -> Result<Vec<Detection>> {
        let image = image::open(path)?;
        self.detect_image(&image)
    }
}

fn model_error(err: impl std::fmt::Display) -> CropError {
    CropError::Model(err.to_string())
}

/// Scale and padding used to fit an image into the square model input.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Letterbox {
    fn unmap(&self, det: Detection) -> Detection {
        Detection {
            x1: (det.x1 - self.pad_x) / self.scale,
            y1: (det.y1 - self.pad_y) / self.scale,
            x2: (det.x2 - self.pad_x) / self.scale,
            y2: (det.y2 - self.pad_y) / self.scale,
            confidence: det.confidence,
        }
    }
}

/// Resizes keeping aspect ratio and centres the result on a gray square.
fn letterbox(image: &DynamicImage, size: u32) -> (RgbImage, Letterbox) {
    let (w, h) = (image.width().max(1), image.height().max(1));
    let scale = (size as f32 / w as f32).min(size as f32 / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).clamp(1, size);
    let new_h = ((h as f32 * scale).round() as u32).clamp(1, size);

    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([114, 114, 114]));
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;
    imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    (
        canvas,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    )
}

pub fn iou(a: &Detection, b: &Detection) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = ix * iy;
    let area = |d: &Detection| (d.x2 - d.x1).max(0.0) * (d.y2 - d.y1).max(0.0);
    let union = area(a) + area(b) - intersection;
    if union <= 0.0 { 0.0 } else { intersection / union }
}

/// Greedy NMS; the result is sorted by descending confidence.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<Detection> = Vec::new();
    for det in detections {
        if kept.iter().all(|k| iou(k, &det) <= iou_threshold) {
            kept.push(det);
        }
    }
    kept
}

/// Pads a face box (more on the left/top than right/bottom, in units of the
/// box height), then grows the shorter side symmetrically to make it square.
pub fn pad_and_square(face: Rect, padding: PaddingPolicy) -> Rect {
    let h = face.height();
    let padded = Rect::from_min_max(
        face.min - Vec2::splat(padding.leading * h),
        face.max + Vec2::splat(padding.trailing * h),
    );
    let side = padded.width().max(padded.height());
    Rect::from_center_size(padded.center(), Vec2::splat(side))
}

pub fn candidates_from(detections: &[Detection], padding: PaddingPolicy) -> Vec<Rect> {
    detections
        .iter()
        .map(|det| pad_and_square(det.rect(), padding))
        .collect()
}
