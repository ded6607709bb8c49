/// Toolbar pane - edit-mode controls and the key color picker
///
/// In normal mode only the edit toggle is offered. While editing, the pane
/// shows selection controls, the save button and a color picker whose
/// changes are applied to every selected key.

use eframe::egui;
use keycap_core::color::KeyColor;
use crate::menu::{self, MenuAction};
use super::{PaneRenderer, SharedPaneState};

const BUTTON_HEIGHT: f32 = 28.0;

/// Toolbar pane state
pub struct ToolbarPane {
    // No local state needed for toolbar
}

impl ToolbarPane {
    pub fn new() -> Self {
        Self {}
    }

    fn action_button(
        ui: &mut egui::Ui,
        shared: &mut SharedPaneState,
        action: MenuAction,
        label: &str,
        hint: &str,
    ) {
        let enabled = menu::action_enabled(action, shared.keyboard.mode());
        let width = ui.available_width();
        let response = ui
            .add_enabled(enabled, egui::Button::new(label).min_size(egui::vec2(width, BUTTON_HEIGHT)))
            .on_hover_text(hint);
        if response.clicked() {
            *shared.pending_action = Some(action);
        }
    }

    fn render_picker(ui: &mut egui::Ui, shared: &mut SharedPaneState) {
        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(egui::vec2(BUTTON_HEIGHT, BUTTON_HEIGHT), egui::Sense::hover());
            draw_color_swatch(ui, swatch, *shared.picker_color);
            ui.monospace(KeyColor::from_egui(*shared.picker_color));
        });

        ui.scope(|ui| {
            ui.spacing_mut().slider_width = shared.config.picker_width;
            let changed = egui::color_picker::color_picker_color32(
                ui,
                shared.picker_color,
                egui::color_picker::Alpha::Opaque,
            );

            if changed {
                let color = KeyColor::from_egui(*shared.picker_color);
                let painted = shared.keyboard.color_changed(&color);
                log::debug!("Picker changed to {} ({} keys)", color, painted);
            }
        });
    }
}

impl PaneRenderer for ToolbarPane {
    fn render_content(&mut self, ui: &mut egui::Ui, rect: egui::Rect, shared: &mut SharedPaneState) {
        let style = shared.theme.style(".toolbar", ui.ctx());
        if let Some(background) = style.background_color {
            ui.painter().rect_filled(rect, 0.0, background);
        }

        ui.vertical(|ui| {
            ui.add_space(8.0);

            let mode = shared.keyboard.mode();
            Self::action_button(
                ui,
                shared,
                MenuAction::ToggleEditMode,
                menu::toggle_edit_label(mode),
                "Switch between pressing keys and recoloring them",
            );

            if mode.is_editing() {
                ui.add_space(4.0);
                ui.columns(2, |columns| {
                    Self::action_button(&mut columns[0], shared, MenuAction::SelectAll, "All", "Select every active key");
                    Self::action_button(&mut columns[1], shared, MenuAction::SelectNone, "None", "Clear the selection");
                });
                Self::action_button(
                    ui,
                    shared,
                    MenuAction::SaveColors,
                    "Save Colors",
                    "Keep the current colors when leaving edit mode",
                );

                ui.separator();
                Self::render_picker(ui, shared);
            } else {
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Press keys to see them on the diagram").weak());
            }

            ui.separator();
            let text_color = style.text_color.unwrap_or(ui.visuals().text_color());
            ui.label(
                egui::RichText::new(format!(
                    "{} mode, {} of {} keys selected",
                    mode.display_name(),
                    shared.keyboard.selection().len(),
                    shared.keyboard.registry().active_count()
                ))
                .color(text_color),
            );
            if !shared.status.is_empty() {
                ui.label(egui::RichText::new(shared.status.as_str()).small().color(text_color));
            }
        });
    }
}

/// Draw a color swatch with a thin border
fn draw_color_swatch(ui: &mut egui::Ui, rect: egui::Rect, color: egui::Color32) {
    ui.painter().rect_filled(rect, 2.0, color);
    ui.painter().rect_stroke(
        rect,
        2.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(80)),
        egui::StrokeKind::Middle,
    );
}
