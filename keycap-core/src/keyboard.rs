//! Keyboard state
//!
//! `KeyboardState` owns everything the event handlers touch: the diagram,
//! the registry, the selection, the edit mode and the live input routes.
//! Every handler runs to completion on the UI thread and leaves the state
//! consistent before returning.

use crate::assets::LoadedKeyboard;
use crate::color;
use crate::diagram::{KeyClasses, KeyDiagram};
use crate::hit_test;
use crate::mode::{EditMode, InputRoutes};
use crate::registry::{KeyCode, KeyRegistry};
use crate::selection::Selection;
use crate::shadow;
use kurbo::Point;

pub struct KeyboardState {
    diagram: KeyDiagram,
    registry: KeyRegistry,
    classes: KeyClasses,
    selection: Selection,
    mode: EditMode,
    routes: InputRoutes,
    /// Bumped on every visible change to the diagram
    revision: u64,
}

impl KeyboardState {
    /// Initialize in normal mode with the stored colors painted on
    pub fn new(diagram: KeyDiagram, registry: KeyRegistry) -> Self {
        Self::with_classes(diagram, registry, KeyClasses::default())
    }

    pub fn with_classes(diagram: KeyDiagram, registry: KeyRegistry, classes: KeyClasses) -> Self {
        let mode = EditMode::Normal;
        let mut state = Self {
            diagram,
            registry,
            classes,
            selection: Selection::new(),
            mode,
            routes: mode.routes(),
            revision: 0,
        };
        let root_class = state.mode.root_class(&state.classes).to_string();
        state.diagram.set_root_class(&root_class);
        state.restore_colors();
        state
    }

    pub fn from_loaded(loaded: LoadedKeyboard) -> Self {
        Self::new(loaded.diagram, loaded.registry)
    }

    pub fn diagram(&self) -> &KeyDiagram {
        &self.diagram
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn classes(&self) -> &KeyClasses {
        &self.classes
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn routes(&self) -> InputRoutes {
        self.routes
    }

    /// Changes whenever the diagram needs to be redrawn
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // --- Edit mode ---

    /// Flip between normal and editing mode
    pub fn toggle_edit(&mut self) {
        match self.mode.toggled() {
            EditMode::Editing => self.enter_editing(),
            EditMode::Normal => self.leave_editing(),
        }
        log::debug!("Edit mode is now {}", self.mode.display_name());
    }

    /// Switch to `mode` if not already there
    pub fn set_mode(&mut self, mode: EditMode) {
        if self.mode != mode {
            self.toggle_edit();
        }
    }

    fn enter_editing(&mut self) {
        self.mode = EditMode::Editing;
        self.routes = self.mode.routes();

        // Key-up is no longer routed, so drop shadows of keys still held
        let active: Vec<KeyCode> = self.registry.active_keys().cloned().collect();
        for code in &active {
            shadow::hide_shadow(&mut self.diagram, &self.registry, &self.classes, code.as_str());
        }

        let root_class = self.mode.root_class(&self.classes).to_string();
        self.diagram.set_root_class(&root_class);
        self.touch();
    }

    fn leave_editing(&mut self) {
        self.routes = EditMode::Normal.routes();
        self.clear_selection();
        self.mode = EditMode::Normal;
        self.restore_colors();

        let root_class = self.mode.root_class(&self.classes).to_string();
        self.diagram.set_root_class(&root_class);
        self.touch();
    }

    // --- Physical keys ---

    /// Physical key pressed; shows the shadow while shadows are routed
    pub fn key_down(&mut self, code: &str) -> bool {
        if !self.routes.key_shadows {
            return false;
        }
        let changed = shadow::show_shadow(&mut self.diagram, &self.registry, &self.classes, code);
        if changed {
            self.touch();
        }
        changed
    }

    /// Physical key released; hides the shadow while shadows are routed
    pub fn key_up(&mut self, code: &str) -> bool {
        if !self.routes.key_shadows {
            return false;
        }
        let changed = shadow::hide_shadow(&mut self.diagram, &self.registry, &self.classes, code);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn has_shadow(&self, code: &str) -> bool {
        shadow::has_shadow(&self.diagram, &self.classes, code)
    }

    // --- Selection ---

    /// Pointer click on a key visual; toggles selection while clicks are routed
    pub fn click(&mut self, code: &str) -> bool {
        if !self.routes.click_select || !self.registry.is_active(code) {
            return false;
        }
        self.toggle_click_select(code)
    }

    /// Click at a point in diagram user space
    pub fn click_at(&mut self, point: Point) -> Option<KeyCode> {
        if !self.routes.click_select {
            return None;
        }
        let code = self.key_at(point)?;
        self.toggle_click_select(code.as_str());
        Some(code)
    }

    /// Active key under a point in diagram user space
    pub fn key_at(&self, point: Point) -> Option<KeyCode> {
        hit_test::hit_test_key(&self.diagram, &self.registry, &self.classes, point, 0.0)
    }

    /// Select or deselect one key, keeping the highlight class in step
    ///
    /// Only active keys can be selected, and only while editing. Returns true
    /// if membership changed.
    pub fn select_item(&mut self, code: &str, want_selected: bool) -> bool {
        if !self.mode.is_editing() || !self.registry.is_active(code) {
            return false;
        }
        let Some(key) = self.diagram.element_mut(code) else {
            return false;
        };

        let changed = if want_selected {
            if self.selection.add(KeyCode::new(code)) {
                key.add_class(&self.classes.selected);
                true
            } else {
                false
            }
        } else if self.selection.remove(code) {
            key.remove_class(&self.classes.selected);
            true
        } else {
            false
        };

        if changed {
            self.touch();
        }
        changed
    }

    /// Select when unselected, deselect when selected
    pub fn toggle_click_select(&mut self, code: &str) -> bool {
        let want = !self.selection.contains(code);
        self.select_item(code, want)
    }

    /// Select or deselect every active key
    pub fn select_all(&mut self, want_selected: bool) {
        let active: Vec<KeyCode> = self.registry.active_keys().cloned().collect();
        for code in &active {
            self.select_item(code.as_str(), want_selected);
        }
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selection.contains(code)
    }

    /// Deselect everything, including any highlight left on a key
    fn clear_selection(&mut self) {
        for code in self.selection.take_all() {
            if let Some(key) = self.diagram.element_mut(code.as_str()) {
                key.remove_class(&self.classes.selected);
            }
        }
        self.touch();
    }

    // --- Colors ---

    /// Color picker change: paint every selected key
    pub fn color_changed(&mut self, color: &str) -> usize {
        let mut painted = 0;
        for code in self.selection.keys() {
            if color::apply_color(&mut self.diagram, &self.registry, &self.classes, code.as_str(), color) {
                painted += 1;
            }
        }
        if painted > 0 {
            self.touch();
        }
        painted
    }

    /// Paint one active key
    pub fn apply_color(&mut self, code: &str, color: &str) -> bool {
        let changed = color::apply_color(&mut self.diagram, &self.registry, &self.classes, code, color);
        if changed {
            self.touch();
        }
        changed
    }

    /// Rendered fill of a key
    pub fn rendered_color(&self, code: &str) -> Option<&str> {
        color::rendered_color(&self.diagram, &self.classes, code)
    }

    /// Commit the rendered colors into the registry
    pub fn snapshot_colors(&mut self) -> usize {
        let committed = color::snapshot_colors(&self.diagram, &mut self.registry, &self.classes);
        log::info!("Saved colors for {} keys", committed);
        committed
    }

    /// Repaint every active key from its committed color
    pub fn restore_colors(&mut self) -> usize {
        let painted = color::restore_colors(&mut self.diagram, &self.registry, &self.classes);
        self.touch();
        painted
    }

    /// SVG markup of the current diagram, optionally with an embedded stylesheet
    pub fn to_svg_string(&self, stylesheet: Option<&str>) -> String {
        self.diagram.to_svg_string(stylesheet)
    }
}
