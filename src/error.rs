use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("Model file not found: {0}. Please place the face detection model in the current directory.")]
    ModelNotFound(PathBuf),

    #[error("Face detection model error: {0}")]
    Model(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scale must be greater than zero, got {0}")]
    InvalidScale(f32),

    #[error("No image loaded")]
    NoImage,

    #[error("No crop box selected")]
    NoSelection,

    #[error("Crop rectangle is empty: {0}x{1}")]
    EmptyCrop(i64, i64),
}

pub type Result<T> = std::result::Result<T, CropError>;
