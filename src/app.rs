use eframe::egui;
use image::imageops::FilterType;

use crate::geometry::Corner;
use crate::interaction::{self, Interaction};
use crate::session::CropSession;

pub struct FaceCropperApp {
    session: CropSession,
    texture: Option<egui::TextureHandle>,
    texture_generation: u64,
}

impl FaceCropperApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: CropSession) -> Self {
        let texture_generation = session.generation().wrapping_sub(1);
        Self {
            session,
            texture: None,
            texture_generation,
        }
    }

    fn load_texture(&mut self, ctx: &egui::Context) {
        self.texture_generation = self.session.generation();
        self.texture = self.session.current().map(|current| {
            let image = &current.image;
            let max_side = ctx.input(|i| i.max_texture_side) as u32;
            let image_buffer = if image.width() > max_side || image.height() > max_side {
                image.resize(max_side, max_side, FilterType::Triangle).to_rgba8()
            } else {
                image.to_rgba8()
            };
            let size = [image_buffer.width() as _, image_buffer.height() as _];
            let pixels = image_buffer.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR)
        });
    }

    fn open_folder(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
            if let Err(err) = self.session.open_folder(&folder) {
                log::error!("Failed to open {}: {err}", folder.display());
                self.session.set_status(format!("Failed to open folder: {err}"));
            }
        }
    }

    fn export(&mut self) {
        if !self.session.can_export() {
            return;
        }
        if let Err(err) = self.session.export() {
            log::error!("Export failed: {err}");
            self.session.set_status(format!("Export failed: {err}"));
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Consumed here so a focused control-bar button never sees the same press.
        let (enter, tab, center) = ctx.input_mut(|i| {
            (
                i.consume_key(egui::Modifiers::NONE, egui::Key::Enter),
                i.consume_key(egui::Modifiers::NONE, egui::Key::Tab),
                i.consume_key(egui::Modifiers::NONE, egui::Key::C),
            )
        });
        if enter || tab {
            ctx.memory_mut(|memory| {
                if let Some(id) = memory.focused() {
                    memory.surrender_focus(id);
                }
            });
        }
        if enter {
            self.export();
        }
        if tab {
            self.session.select_next();
        }
        if center {
            self.session.center_on_selection();
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open Folder").clicked() {
                self.open_folder();
            }
            if ui
                .add_enabled(self.session.can_export(), egui::Button::new("Crop & Save"))
                .clicked()
            {
                self.export();
            }
            let mut sharpen = self.session.config().sharpen;
            if ui.checkbox(&mut sharpen, "Sharpen").changed() {
                self.session.set_sharpen(sharpen);
            }
            ui.separator();
            ui.label(self.session.status());
        });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas = response.rect;
        let origin = canvas.min.to_vec2();
        let to_local = |p: egui::Pos2| p - origin;
        self.session.set_canvas_size(canvas.size());

        // Handle Input
        if response.drag_started() {
            let press = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(pos) = press {
                self.session.pointer_down(to_local(pos));
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.session.pointer_move(to_local(pos));
            }
        }
        if response.drag_stopped() {
            self.session.pointer_up();
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.session.click(to_local(pos));
            }
        }
        if response.hovered() {
            for delta in ui.input(|i| interaction::wheel_steps(&i.events)) {
                self.session.scroll(delta);
            }
        }

        match self.session.interaction() {
            Interaction::Idle => {}
            Interaction::Panning { .. } | Interaction::MovingBox { .. } => {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
            }
            Interaction::ResizingBox { corner, .. } => {
                let icon = match corner {
                    Corner::TopLeft | Corner::BottomRight => egui::CursorIcon::ResizeNwSe,
                    Corner::TopRight | Corner::BottomLeft => egui::CursorIcon::ResizeNeSw,
                };
                ui.ctx().set_cursor_icon(icon);
            }
        }

        let view = *self.session.view();

        // Draw image
        if let (Some(texture), Some(current)) = (&self.texture, self.session.current()) {
            let size = egui::vec2(current.image.width() as f32, current.image.height() as f32);
            let image_rect = egui::Rect::from_min_max(
                view.to_canvas(egui::Pos2::ZERO) + origin,
                view.to_canvas(size.to_pos2()) + origin,
            );
            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        // Draw candidate boxes, selected one last so it sits on top
        let selection = self.session.selection();
        let selected = selection.selected();
        for (i, rect) in selection.candidates().iter().enumerate() {
            if Some(i) == selected {
                continue;
            }
            painter.rect_stroke(
                view.rect_to_canvas(*rect).translate(origin),
                0.0,
                egui::Stroke::new(1.5, egui::Color32::YELLOW),
            );
        }
        if let Some(rect) = selection.selected_box() {
            let screen_rect = view.rect_to_canvas(rect).translate(origin);
            painter.rect_stroke(screen_rect, 0.0, egui::Stroke::new(2.0, egui::Color32::RED));

            // Draw handles
            let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
            for corner in Corner::ALL {
                painter.circle(
                    corner.position(screen_rect),
                    6.0,
                    egui::Color32::WHITE,
                    handle_stroke,
                );
            }
        }
    }
}

impl eframe::App for FaceCropperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.texture_generation != self.session.generation() {
            self.load_texture(ctx);
        }

        self.handle_keys(ctx);

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::GRAY))
            .show(ctx, |ui| self.canvas(ui));

        // Export and folder changes swap the image mid-frame.
        if self.texture_generation != self.session.generation() {
            ctx.request_repaint();
        }
    }
}
