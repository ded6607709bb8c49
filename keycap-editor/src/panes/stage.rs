/// Stage pane - keyboard diagram canvas
///
/// Rasterizes the diagram (with the key stylesheet embedded) through resvg
/// into an egui texture, re-rendering only when the keyboard state, the
/// display size or the theme changes. Clicks are mapped back into diagram
/// user space and routed through hit testing.

use eframe::egui;
use keycap_core::KeyboardState;
use kurbo::{Point, Rect};
use super::{PaneRenderer, SharedPaneState};

/// Largest texture edge we rasterize to
const MAX_TEXTURE_SIZE: u32 = 4096;

/// What the current texture was rendered from
#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderKey {
    revision: u64,
    width: u32,
    height: u32,
    dark: bool,
}

/// Rasterized keyboard diagram
struct KeyboardTexture {
    texture: egui::TextureHandle,
    key: RenderKey,
}

pub struct StagePane {
    texture: Option<KeyboardTexture>,
    zoom: f32,
    pan_offset: egui::Vec2,
    last_pan_pos: Option<egui::Pos2>,
    /// Set after a failed render so the error is logged once per state
    failed_key: Option<RenderKey>,
}

impl StagePane {
    pub fn new() -> Self {
        Self {
            texture: None,
            zoom: 1.0,
            pan_offset: egui::Vec2::ZERO,
            last_pan_pos: None,
            failed_key: None,
        }
    }

    /// Reset pan and zoom, e.g. after loading another keyboard
    pub fn recenter(&mut self) {
        self.pan_offset = egui::Vec2::ZERO;
        self.zoom = 1.0;
        self.texture = None;
        self.failed_key = None;
    }

    /// Screen rect the diagram occupies: fitted to the pane, then zoomed and panned
    fn image_rect(&self, rect: egui::Rect, view_box: Rect) -> egui::Rect {
        let margin = 16.0;
        let available = (rect.size() - egui::vec2(margin, margin) * 2.0).max(egui::vec2(1.0, 1.0));
        let scale = (available.x / view_box.width() as f32).min(available.y / view_box.height() as f32);
        let size = egui::vec2(view_box.width() as f32, view_box.height() as f32) * scale * self.zoom;
        egui::Rect::from_center_size(rect.center() + self.pan_offset, size)
    }

    fn handle_view_input(&mut self, ui: &egui::Ui, response: &egui::Response, rect: egui::Rect) {
        if !response.hovered() {
            self.last_pan_pos = None;
            return;
        }

        // Ctrl/Cmd + wheel zooms around the pointer
        let (zoom_delta, command) = ui.input(|i| (i.zoom_delta(), i.modifiers.command));
        if command && zoom_delta != 1.0 {
            let pointer = response.hover_pos().unwrap_or(rect.center()) - rect.center();
            let old_zoom = self.zoom;
            self.zoom = (self.zoom * zoom_delta).clamp(0.25, 8.0);
            let factor = self.zoom / old_zoom;
            self.pan_offset = pointer - (pointer - self.pan_offset) * factor;
        }

        // Alt + drag pans
        let alt_held = ui.input(|i| i.modifiers.alt);
        if alt_held && response.dragged() {
            if let (Some(last), Some(current)) = (self.last_pan_pos, response.interact_pointer_pos()) {
                self.pan_offset += current - last;
            }
            self.last_pan_pos = response.interact_pointer_pos();
        } else if !response.dragged() {
            self.last_pan_pos = None;
        }
    }

    /// Rasterize the diagram if anything it depends on changed
    fn ensure_texture(
        &mut self,
        ctx: &egui::Context,
        keyboard: &KeyboardState,
        stylesheet: &str,
        key: RenderKey,
    ) {
        if self.texture.as_ref().is_some_and(|t| t.key == key) || self.failed_key == Some(key) {
            return;
        }

        match rasterize(keyboard, stylesheet, key.width, key.height) {
            Ok(image) => {
                match &mut self.texture {
                    Some(existing) => {
                        existing.texture.set(image, egui::TextureOptions::LINEAR);
                        existing.key = key;
                    }
                    None => {
                        let texture = ctx.load_texture("keyboard-diagram", image, egui::TextureOptions::LINEAR);
                        self.texture = Some(KeyboardTexture { texture, key });
                    }
                }
                self.failed_key = None;
            }
            Err(e) => {
                log::error!("{}", e);
                self.failed_key = Some(key);
            }
        }
    }
}

/// Render the keyboard SVG into an RGBA image of the given pixel size
fn rasterize(
    keyboard: &KeyboardState,
    stylesheet: &str,
    width: u32,
    height: u32,
) -> Result<egui::ColorImage, String> {
    let svg = keyboard.to_svg_string(Some(stylesheet));
    let tree = resvg::usvg::Tree::from_data(svg.as_bytes(), &resvg::usvg::Options::default())
        .map_err(|e| format!("Failed to parse keyboard SVG for rendering: {}", e))?;

    let tree_size = tree.size();
    let scale_x = width as f32 / tree_size.width();
    let scale_y = height as f32 / tree_size.height();

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("Failed to allocate {}x{} pixmap", width, height))?;
    let transform = resvg::tiny_skia::Transform::from_scale(scale_x, scale_y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied RGBA
    let size = [pixmap.width() as usize, pixmap.height() as usize];
    Ok(egui::ColorImage::from_rgba_premultiplied(size, pixmap.data()))
}

/// Map a screen position inside `image_rect` to diagram user space
fn to_user_space(pos: egui::Pos2, image_rect: egui::Rect, view_box: Rect) -> Point {
    let u = ((pos.x - image_rect.min.x) / image_rect.width()) as f64;
    let v = ((pos.y - image_rect.min.y) / image_rect.height()) as f64;
    Point::new(
        view_box.x0 + u * view_box.width(),
        view_box.y0 + v * view_box.height(),
    )
}

impl PaneRenderer for StagePane {
    fn render_content(&mut self, ui: &mut egui::Ui, rect: egui::Rect, shared: &mut SharedPaneState) {
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        self.handle_view_input(ui, &response, rect);

        let background = shared
            .theme
            .style("#stage", ui.ctx())
            .background_color
            .unwrap_or(egui::Color32::from_gray(40));
        ui.painter().rect_filled(rect, 0.0, background);

        let Some(view_box) = shared.keyboard.diagram().view_box().filter(|vb| vb.area() > 0.0) else {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Keyboard diagram has no size",
                egui::FontId::proportional(14.0),
                egui::Color32::from_gray(200),
            );
            return;
        };

        let image_rect = self.image_rect(rect, view_box);
        let pixels_per_point = ui.ctx().pixels_per_point();
        let dark = shared.theme.is_dark(ui.ctx());
        let key = RenderKey {
            revision: shared.keyboard.revision(),
            width: ((image_rect.width() * pixels_per_point).round() as u32).clamp(1, MAX_TEXTURE_SIZE),
            height: ((image_rect.height() * pixels_per_point).round() as u32).clamp(1, MAX_TEXTURE_SIZE),
            dark,
        };
        let stylesheet = shared.theme.key_stylesheet(shared.keyboard.classes(), dark);
        self.ensure_texture(ui.ctx(), shared.keyboard, &stylesheet, key);

        if let Some(texture) = &self.texture {
            ui.painter().with_clip_rect(rect).image(
                texture.texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        let pointer = response.hover_pos().filter(|pos| image_rect.contains(*pos));
        let alt_held = ui.input(|i| i.modifiers.alt);

        if let Some(pos) = pointer {
            if shared.keyboard.routes().click_select && !alt_held {
                let point = to_user_space(pos, image_rect, view_box);
                if shared.keyboard.key_at(point).is_some() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
            }
        }

        if response.clicked() && !alt_held {
            if let Some(pos) = response.interact_pointer_pos().filter(|pos| image_rect.contains(*pos)) {
                let point = to_user_space(pos, image_rect, view_box);
                if let Some(code) = shared.keyboard.click_at(point) {
                    *shared.status = format!(
                        "{} {} ({} selected)",
                        code,
                        if shared.keyboard.is_selected(code.as_str()) { "selected" } else { "deselected" },
                        shared.keyboard.selection().len()
                    );
                }
            }
        }
    }
}
