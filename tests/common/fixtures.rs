use std::path::{Path, PathBuf};

use face_cropper::{CropError, CropperConfig, Detection, FaceDetector, Result};
use image::{ImageBuffer, Rgb};

/// Detector whose answer is computed from the image path.
pub struct FnDetector<F>(pub F);

impl<F> FaceDetector for FnDetector<F>
where
    F: Fn(&Path) -> Result<Vec<Detection>>,
{
    fn predict(&self, path: &Path) -> Result<Vec<Detection>> {
        (self.0)(path)
    }
}

pub fn no_faces() -> Box<dyn FaceDetector> {
    Box::new(FnDetector(|_: &Path| -> Result<Vec<Detection>> {
        Ok(Vec::new())
    }))
}

pub fn same_faces(faces: Vec<Detection>) -> Box<dyn FaceDetector> {
    Box::new(FnDetector(move |_: &Path| -> Result<Vec<Detection>> {
        Ok(faces.clone())
    }))
}

pub fn failing_detector() -> Box<dyn FaceDetector> {
    Box::new(FnDetector(|_: &Path| -> Result<Vec<Detection>> {
        Err(CropError::Model("inference failed".to_owned()))
    }))
}

pub fn face(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection {
        x1,
        y1,
        x2,
        y2,
        confidence: 0.9,
    }
}

/// Writes a `width` x `height` gradient image; the format follows the extension.
pub fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let path = dir.join(name);
    img.save(&path).expect("Failed to save test image");
    path
}

/// Config writing into `<dir>/output`.
pub fn config_in(dir: &Path) -> CropperConfig {
    CropperConfig {
        output_dir: dir.join("output"),
        ..CropperConfig::default()
    }
}
