//! Pointer and scroll handling for the crop canvas.
//!
//! All positions handed to this module are canvas-space. Exactly one of
//! panning, moving or resizing can be active; the choice is made once, on
//! pointer-down, by hit-testing the selected box.

use eframe::egui::{self, Pos2, Rect};

use crate::geometry::{Corner, ViewState, corner_at};
use crate::selection::Selection;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Panning {
        last: Pos2,
    },
    MovingBox {
        start_pointer: Pos2,
        start_box: Rect,
    },
    ResizingBox {
        corner: Corner,
        /// Image-space corner that stays put.
        anchor: Pos2,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        view: &ViewState,
        selection: &Selection,
        handle_radius: f32,
    ) {
        *self = match selection.selected_box() {
            Some(image_box) => {
                let canvas_box = view.rect_to_canvas(image_box);
                if let Some(corner) = corner_at(pos, canvas_box, handle_radius) {
                    Interaction::ResizingBox {
                        corner,
                        anchor: corner.opposite().position(image_box),
                    }
                } else if canvas_box.contains(pos) {
                    Interaction::MovingBox {
                        start_pointer: pos,
                        start_box: image_box,
                    }
                } else {
                    Interaction::Panning { last: pos }
                }
            }
            None => Interaction::Panning { last: pos },
        };
        log::debug!("Pointer down at {pos:?}: {self:?}");
    }

    pub fn pointer_move(&mut self, pos: Pos2, view: &mut ViewState, selection: &mut Selection) {
        match self {
            Interaction::Idle => {}
            Interaction::Panning { last } => {
                view.pan(pos - *last);
                *last = pos;
            }
            Interaction::MovingBox {
                start_pointer,
                start_box,
            } => {
                let delta = view.delta_to_image(pos - *start_pointer);
                selection.replace_selected(start_box.translate(delta));
            }
            Interaction::ResizingBox { corner, anchor } => {
                let pointer = view.to_image(pos);
                if !selection.resize_from_anchor(*anchor, *corner, pointer) {
                    log::trace!("Resize to {pointer:?} rejected");
                }
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if !self.is_idle() {
            log::debug!("Pointer up, leaving {self:?}");
        }
        *self = Interaction::Idle;
    }

    /// Selects the candidate under `pos`. Only honoured while idle.
    pub fn click(&self, pos: Pos2, view: &ViewState, selection: &mut Selection) -> bool {
        if !self.is_idle() {
            return false;
        }
        match selection.candidate_at(view.to_image(pos)) {
            Some(index) => {
                selection.select(index);
                log::debug!("Selected candidate {index}");
                true
            }
            None => false,
        }
    }
}

/// Zooms one step per scroll event: in for a positive delta, out for a negative one.
pub fn scroll(view: &mut ViewState, delta: f32, zoom_factor: f32) {
    if delta > 0.0 {
        view.zoom(zoom_factor);
    } else if delta < 0.0 {
        view.zoom(1.0 / zoom_factor);
    }
}

/// Vertical delta of every mouse-wheel event in `events`, one entry per notch
/// or trackpad update. Horizontal-only events are dropped.
pub fn wheel_steps(events: &[egui::Event]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::MouseWheel { delta, .. } if delta.y != 0.0 => Some(delta.y),
            _ => None,
        })
        .collect()
}
