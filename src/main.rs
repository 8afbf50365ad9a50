#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;

use face_cropper::{CropSession, CropperConfig, FaceCropperApp, YoloFaceDetector};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CropperConfig::default();
    let model_path = config.model_path()?;
    let detector = YoloFaceDetector::load(&model_path, &config).inspect_err(|err| {
        log::error!("{err}");
    })?;
    let session = CropSession::new(config, Box::new(detector));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Accurate Crop Tool with Face Detection",
        options,
        Box::new(|cc| Ok(Box::new(FaceCropperApp::new(cc, session)))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}
