use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui::Rect;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::error::{CropError, Result};

/// 3x3 detail-enhancement kernel, normalised by its sum when applied.
const DETAIL_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 10.0, -1.0, 0.0, -1.0, 0.0];

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub output_size: u32,
    pub sharpen: bool,
}

/// Integer crop bounds `(x1, y1, x2, y2)`, truncated toward zero.
pub fn pixel_bounds(rect: Rect) -> (i64, i64, i64, i64) {
    (
        rect.min.x as i64,
        rect.min.y as i64,
        rect.max.x as i64,
        rect.max.y as i64,
    )
}

/// The part of a crop box that overlaps the source image.
#[derive(Debug)]
pub struct VisibleCrop {
    /// Source pixels inside both the box and the image.
    pub pixels: RgbaImage,
    /// Position of `pixels` inside the box.
    pub offset: (i64, i64),
    /// Full box size, including any part outside the image.
    pub box_size: (i64, i64),
}

/// Cuts the image-covered part of `rect` out of `image`. `None` when the box
/// lies entirely outside the image.
pub fn crop_visible(image: &DynamicImage, rect: Rect) -> Result<Option<VisibleCrop>> {
    let (x1, y1, x2, y2) = pixel_bounds(rect);
    let (width, height) = (x2 - x1, y2 - y1);
    if width <= 0 || height <= 0 {
        return Err(CropError::EmptyCrop(width, height));
    }

    let ix1 = x1.max(0);
    let iy1 = y1.max(0);
    let ix2 = x2.min(image.width() as i64);
    let iy2 = y2.min(image.height() as i64);
    if ix2 <= ix1 || iy2 <= iy1 {
        return Ok(None);
    }
    let pixels = image
        .crop_imm(ix1 as u32, iy1 as u32, (ix2 - ix1) as u32, (iy2 - iy1) as u32)
        .to_rgba8();
    Ok(Some(VisibleCrop {
        pixels,
        offset: (ix1 - x1, iy1 - y1),
        box_size: (width, height),
    }))
}

pub fn sharpen(image: &RgbaImage) -> RgbaImage {
    let mut out = imageops::filter3x3(image, &DETAIL_KERNEL);
    // filter3x3 leaves the outermost ring blank.
    let (w, h) = image.dimensions();
    for (x, y, pixel) in image.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
            out.put_pixel(x, y, *pixel);
        }
    }
    out
}

/// Maps a span `[start, end)` of a box `len` pixels long onto `0..output_size`.
fn scale_span(start: i64, end: i64, len: i64, output_size: u32) -> (i64, u32) {
    let factor = f64::from(output_size) / len as f64;
    let from = (start as f64 * factor).round() as i64;
    let to = (end as f64 * factor).round() as i64;
    (from, (to - from).max(0) as u32)
}

/// Crop, optional sharpening, then a Lanczos resize to the output square.
/// Only the image-covered part of the box is resampled; the rest of the
/// output stays transparent, so memory use does not grow with the box.
pub fn render_crop(
    image: &DynamicImage,
    rect: Rect,
    output_size: u32,
    sharpen_detail: bool,
) -> Result<RgbaImage> {
    let mut out = RgbaImage::new(output_size, output_size);
    let Some(visible) = crop_visible(image, rect)? else {
        return Ok(out);
    };
    let pixels = if sharpen_detail {
        sharpen(&visible.pixels)
    } else {
        visible.pixels
    };

    let (ox, oy) = visible.offset;
    let (box_w, box_h) = visible.box_size;
    let (x, width) = scale_span(ox, ox + i64::from(pixels.width()), box_w, output_size);
    let (y, height) = scale_span(oy, oy + i64::from(pixels.height()), box_h, output_size);
    if width == 0 || height == 0 {
        log::debug!("Visible part of the crop shrinks below one output pixel");
        return Ok(out);
    }
    let resized = imageops::resize(&pixels, width, height, FilterType::Lanczos3);
    imageops::replace(&mut out, &resized, x, y);
    Ok(out)
}

/// `cropped_<sequence>.png` inside `dir`; `sequence` is 1-based.
pub fn output_path(dir: &Path, sequence: usize) -> PathBuf {
    dir.join(format!("cropped_{sequence}.png"))
}

/// Renders and writes one crop, replacing any existing file of the same name.
pub fn export_crop(
    image: &DynamicImage,
    rect: Rect,
    options: &ExportOptions,
    sequence: usize,
) -> Result<PathBuf> {
    let rendered = render_crop(image, rect, options.output_size, options.sharpen)?;
    fs::create_dir_all(&options.output_dir)?;
    let path = output_path(&options.output_dir, sequence);
    rendered.save(&path)?;
    log::info!("Saved: {}", path.display());
    Ok(path)
}
