mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from face_cropper for tests
pub use face_cropper::{
    CropError, CropSession, CropperConfig, Detection, FaceDetector, Result, Selection, ViewState,
};
