//! Candidate crop boxes for the current image, in image space.

use eframe::egui::{self, Pos2, Rect, Vec2};

use crate::geometry::{Corner, ViewState};

#[derive(Clone, Debug)]
pub struct Selection {
    candidates: Vec<Rect>,
    selected: Option<usize>,
    min_size: f32,
}

impl Selection {
    pub fn new(min_size: f32) -> Self {
        Self {
            candidates: Vec::new(),
            selected: None,
            min_size,
        }
    }

    /// Replaces every candidate. A lone candidate is selected right away.
    pub fn set_candidates(&mut self, candidates: Vec<Rect>) {
        self.selected = (candidates.len() == 1).then_some(0);
        self.candidates = candidates;
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.selected = None;
    }

    pub fn candidates(&self) -> &[Rect] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_box(&self) -> Option<Rect> {
        self.selected.and_then(|i| self.candidates.get(i).copied())
    }

    pub fn select(&mut self, index: usize) {
        if index < self.candidates.len() {
            self.selected = Some(index);
        }
    }

    /// Selects the candidate after the current one, wrapping around.
    pub fn select_next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let next = self.selected.map_or(0, |i| (i + 1) % self.candidates.len());
        self.selected = Some(next);
    }

    /// Topmost candidate containing `p`, preferring later (drawn last) boxes.
    pub fn candidate_at(&self, p: Pos2) -> Option<usize> {
        self.candidates.iter().rposition(|rect| rect.contains(p))
    }

    pub fn move_selected(&mut self, delta: Vec2) {
        if let Some(rect) = self.selected_mut() {
            *rect = rect.translate(delta);
        }
    }

    /// Overwrites the selected box geometry.
    pub fn replace_selected(&mut self, rect: Rect) {
        if let Some(current) = self.selected_mut() {
            *current = rect;
        }
    }

    /// Square-locked resize by dragging `corner`, keeping the opposite corner fixed.
    /// Returns false, leaving the box untouched, when the result would be too small.
    pub fn resize_selected(&mut self, corner: Corner, pointer: Pos2) -> bool {
        match self.selected_box() {
            Some(rect) => self.resize_from_anchor(corner.opposite().position(rect), corner, pointer),
            None => false,
        }
    }

    pub fn resize_from_anchor(&mut self, anchor: Pos2, corner: Corner, pointer: Pos2) -> bool {
        let min_size = self.min_size;
        let Some(rect) = self.selected_mut() else {
            return false;
        };
        let resized = square_from_anchor(anchor, corner, pointer);
        if resized.width() < min_size || resized.height() < min_size {
            return false;
        }
        *rect = resized;
        true
    }

    fn selected_mut(&mut self) -> Option<&mut Rect> {
        self.selected.and_then(|i| self.candidates.get_mut(i))
    }
}

/// Square with one corner at `anchor` and edge `max(|dx|, |dy|)` towards `pointer`.
/// An axis with no offset grows in the dragged corner's own direction.
pub fn square_from_anchor(anchor: Pos2, corner: Corner, pointer: Pos2) -> Rect {
    let d = pointer - anchor;
    let side = d.x.abs().max(d.y.abs());
    let dir = corner.direction();
    let sx = if d.x != 0.0 { d.x.signum() } else { dir.x };
    let sy = if d.y != 0.0 { d.y.signum() } else { dir.y };
    Rect::from_two_pos(anchor, anchor + egui::vec2(sx * side, sy * side))
}

/// Fallback box centered on the visible canvas, `box_size` canvas pixels wide.
pub fn default_candidate(view: &ViewState, canvas_size: Vec2, box_size: f32) -> Rect {
    let center = view.to_image((canvas_size / 2.0).to_pos2());
    let side = box_size / view.scale();
    Rect::from_center_size(center, egui::vec2(side, side))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Rect {
        Rect::from_min_max(egui::pos2(x1, y1), egui::pos2(x2, y2))
    }

    fn single(r: Rect) -> Selection {
        let mut selection = Selection::new(20.0);
        selection.set_candidates(vec![r]);
        selection
    }

    #[test]
    fn lone_candidate_is_auto_selected() {
        let mut selection = Selection::new(20.0);
        selection.set_candidates(vec![rect(0.0, 0.0, 50.0, 50.0)]);
        assert_eq!(selection.selected(), Some(0));

        selection.set_candidates(vec![]);
        assert_eq!(selection.selected(), None);

        selection.set_candidates(vec![rect(0.0, 0.0, 50.0, 50.0), rect(60.0, 0.0, 90.0, 30.0)]);
        assert_eq!(selection.selected(), None);
        selection.select(1);
        assert_eq!(selection.selected(), Some(1));
    }

    #[test]
    fn select_out_of_range_is_noop() {
        let mut selection = single(rect(0.0, 0.0, 50.0, 50.0));
        selection.select(3);
        assert_eq!(selection.selected(), Some(0));
    }

    #[test]
    fn select_next_wraps() {
        let mut selection = Selection::new(20.0);
        selection.set_candidates(vec![rect(0.0, 0.0, 50.0, 50.0), rect(60.0, 0.0, 90.0, 30.0)]);
        selection.select_next();
        assert_eq!(selection.selected(), Some(0));
        selection.select_next();
        assert_eq!(selection.selected(), Some(1));
        selection.select_next();
        assert_eq!(selection.selected(), Some(0));
    }

    #[test]
    fn move_keeps_size() {
        let mut selection = single(rect(10.0, 20.0, 110.0, 120.0));
        selection.move_selected(egui::vec2(5.5, -3.0));
        assert_eq!(selection.selected_box(), Some(rect(15.5, 17.0, 115.5, 117.0)));
    }

    #[test]
    fn resize_is_square_locked() {
        let mut selection = single(rect(100.0, 100.0, 200.0, 200.0));
        assert!(selection.resize_selected(Corner::BottomRight, egui::pos2(260.0, 230.0)));
        let r = selection.selected_box().unwrap();
        assert_eq!(r, rect(100.0, 100.0, 260.0, 260.0));
        assert_eq!(r.width(), r.height());

        assert!(selection.resize_selected(Corner::TopLeft, egui::pos2(190.0, 150.0)));
        let r = selection.selected_box().unwrap();
        assert_eq!(r, rect(150.0, 150.0, 260.0, 260.0));
    }

    #[test]
    fn resize_below_minimum_is_rejected() {
        let original = rect(100.0, 100.0, 200.0, 200.0);
        let mut selection = single(original);
        assert!(!selection.resize_selected(Corner::BottomRight, egui::pos2(115.0, 110.0)));
        assert_eq!(selection.selected_box(), Some(original));
    }

    #[test]
    fn resize_across_anchor_flips() {
        let mut selection = single(rect(100.0, 100.0, 200.0, 200.0));
        assert!(selection.resize_selected(Corner::BottomRight, egui::pos2(40.0, 70.0)));
        assert_eq!(selection.selected_box(), Some(rect(40.0, 40.0, 100.0, 100.0)));
    }

    #[test]
    fn resize_from_mixed_sign_corners() {
        let start = rect(100.0, 100.0, 200.0, 200.0);

        let mut selection = single(start);
        assert!(selection.resize_selected(Corner::TopRight, egui::pos2(230.0, 150.0)));
        assert_eq!(selection.selected_box(), Some(rect(100.0, 70.0, 230.0, 200.0)));

        let mut selection = single(start);
        assert!(selection.resize_selected(Corner::BottomLeft, egui::pos2(170.0, 190.0)));
        assert_eq!(selection.selected_box(), Some(rect(110.0, 100.0, 200.0, 190.0)));

        // Pointer level with the anchor: the free axis grows towards the dragged corner.
        let mut selection = single(start);
        assert!(selection.resize_selected(Corner::BottomLeft, egui::pos2(200.0, 150.0)));
        assert_eq!(selection.selected_box(), Some(rect(150.0, 100.0, 200.0, 150.0)));
    }

    #[test]
    fn mixed_sign_corners_flip_across_anchor() {
        let start = rect(100.0, 100.0, 200.0, 200.0);

        let mut selection = single(start);
        assert!(selection.resize_selected(Corner::TopRight, egui::pos2(60.0, 240.0)));
        assert_eq!(selection.selected_box(), Some(rect(60.0, 200.0, 100.0, 240.0)));

        let mut selection = single(start);
        assert!(selection.resize_selected(Corner::BottomLeft, egui::pos2(260.0, 40.0)));
        assert_eq!(selection.selected_box(), Some(rect(200.0, 40.0, 260.0, 100.0)));
    }

    #[test]
    fn resize_without_selection_does_nothing() {
        let mut selection = Selection::new(20.0);
        selection.set_candidates(vec![rect(0.0, 0.0, 50.0, 50.0), rect(60.0, 0.0, 90.0, 30.0)]);
        assert!(!selection.resize_selected(Corner::TopLeft, egui::pos2(-100.0, -100.0)));
        assert_eq!(selection.candidates()[0], rect(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn candidate_at_prefers_topmost() {
        let mut selection = Selection::new(20.0);
        selection.set_candidates(vec![rect(0.0, 0.0, 100.0, 100.0), rect(50.0, 50.0, 150.0, 150.0)]);
        assert_eq!(selection.candidate_at(egui::pos2(75.0, 75.0)), Some(1));
        assert_eq!(selection.candidate_at(egui::pos2(10.0, 10.0)), Some(0));
        assert_eq!(selection.candidate_at(egui::pos2(400.0, 10.0)), None);
    }

    #[test]
    fn default_candidate_is_centered_on_view() {
        let view = ViewState::new(egui::vec2(-100.0, 0.0), 2.0).unwrap();
        let r = default_candidate(&view, egui::vec2(800.0, 600.0), 512.0);
        assert_eq!(r.center(), egui::pos2(250.0, 150.0));
        assert_eq!(r.width(), 256.0);
        assert_eq!(r.height(), 256.0);
    }
}
