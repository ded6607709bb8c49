/// Pane implementations for the editor
///
/// Each pane type has its own module with implementation details.
/// Panes can hold local state and access shared state through SharedPaneState.

use eframe::egui;
use keycap_core::KeyboardState;

pub mod stage;
pub mod toolbar;

/// Shared state that all panes can access
pub struct SharedPaneState<'a> {
    pub keyboard: &'a mut KeyboardState,
    pub theme: &'a crate::theme::Theme,
    pub config: &'a crate::config::AppConfig,
    /// Current color picker value, carried across frames
    pub picker_color: &'a mut egui::Color32,
    /// Menu-equivalent action requested by a pane, executed after rendering
    pub pending_action: &'a mut Option<crate::menu::MenuAction>,
    /// One-line status shown at the bottom of the toolbar
    pub status: &'a mut String,
}

/// Trait for pane rendering
///
/// Panes implement this trait to provide custom rendering logic for the
/// area they are given.
pub trait PaneRenderer {
    /// Render the main content area
    fn render_content(&mut self, ui: &mut egui::Ui, rect: egui::Rect, shared: &mut SharedPaneState);
}
