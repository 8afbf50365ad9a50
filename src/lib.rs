//! Batch square cropping assisted by face detection.
//!
//! A folder of photos is opened, each image gets one or more candidate crop
//! boxes from the face detector (or a centered fallback), the operator
//! adjusts the selected box on a pan/zoom canvas, and every crop is written
//! as a fixed-size PNG.

pub mod app;
pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod selection;
pub mod session;

pub use app::FaceCropperApp;
pub use config::{CropperConfig, PaddingPolicy};
pub use detection::{Detection, FaceDetector, YoloFaceDetector};
pub use error::{CropError, Result};
pub use geometry::{Corner, ViewState};
pub use interaction::Interaction;
pub use selection::Selection;
pub use session::CropSession;
