//! Canvas <-> image coordinate mapping.
//!
//! Image space is the unscaled source image. Canvas space is the drawing
//! surface, with its origin at the canvas top-left corner. A point maps as
//! `canvas = image * scale + offset`, independently on each axis.

use eframe::egui::{self, Pos2, Rect, Vec2};

use crate::error::{CropError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    pub fn position(self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.min,
            Corner::TopRight => egui::pos2(rect.max.x, rect.min.y),
            Corner::BottomLeft => egui::pos2(rect.min.x, rect.max.y),
            Corner::BottomRight => rect.max,
        }
    }

    /// Unit direction pointing from the opposite corner towards this one.
    pub fn direction(self) -> Vec2 {
        match self {
            Corner::TopLeft => egui::vec2(-1.0, -1.0),
            Corner::TopRight => egui::vec2(1.0, -1.0),
            Corner::BottomLeft => egui::vec2(-1.0, 1.0),
            Corner::BottomRight => egui::vec2(1.0, 1.0),
        }
    }
}

pub fn to_canvas(p: Pos2, offset: Vec2, scale: f32) -> Pos2 {
    egui::pos2(p.x * scale + offset.x, p.y * scale + offset.y)
}

pub fn to_image(p: Pos2, offset: Vec2, scale: f32) -> Result<Pos2> {
    if !(scale > 0.0) {
        return Err(CropError::InvalidScale(scale));
    }
    Ok(unscale(p, offset, scale))
}

/// Inverse of [`to_canvas`]. Callers guarantee `scale > 0`.
fn unscale(p: Pos2, offset: Vec2, scale: f32) -> Pos2 {
    egui::pos2((p.x - offset.x) / scale, (p.y - offset.y) / scale)
}

/// Pan offset and zoom of the canvas. `scale` is always > 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    offset: Vec2,
    scale: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewState {
    pub fn new(offset: Vec2, scale: f32) -> Result<Self> {
        if !(scale > 0.0) || !scale.is_finite() {
            return Err(CropError::InvalidScale(scale));
        }
        Ok(Self { offset, scale })
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_canvas(&self, p: Pos2) -> Pos2 {
        to_canvas(p, self.offset, self.scale)
    }

    pub fn to_image(&self, p: Pos2) -> Pos2 {
        unscale(p, self.offset, self.scale)
    }

    /// Converts a canvas-space distance into image-space units.
    pub fn delta_to_image(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    pub fn rect_to_canvas(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_canvas(rect.min), self.to_canvas(rect.max))
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiplies the scale, leaving the offset untouched so the zoom is
    /// anchored at the canvas origin. Factors that would break `scale > 0`
    /// are ignored.
    pub fn zoom(&mut self, factor: f32) {
        let next = self.scale * factor;
        if next > 0.0 && next.is_finite() {
            self.scale = next;
        } else {
            log::warn!("Ignoring zoom factor {factor} at scale {}", self.scale);
        }
    }

    /// Pans so that `image_point` lands in the middle of a canvas of `canvas_size`.
    pub fn center_on(&mut self, image_point: Pos2, canvas_size: Vec2) {
        self.offset = canvas_size / 2.0 - image_point.to_vec2() * self.scale;
    }
}

/// Finds the corner glyph of `rect` (canvas space) within `tolerance` of `pos`.
pub fn corner_at(pos: Pos2, rect: Rect, tolerance: f32) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|corner| pos.distance(corner.position(rect)) < tolerance)
}
