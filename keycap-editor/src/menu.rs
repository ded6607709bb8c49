/// Menu implementation using muda (native on macOS) and egui (elsewhere)
///
/// Menu definitions are centralized so the native menu, the egui menu bar
/// and the keyboard shortcut handler are all generated from one table.

use eframe::egui;
use keycap_core::mode::EditMode;
use muda::{
    accelerator::{Accelerator, Code, Modifiers},
    Menu, MenuItem, PredefinedMenuItem, Submenu,
};

/// Keyboard shortcut definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: ShortcutKey,
    pub ctrl: bool,
    pub shift: bool,
}

/// Keys that can be used in shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    A, E, O, Q, S,
}

impl ShortcutKey {
    fn code(self) -> Code {
        match self {
            ShortcutKey::A => Code::KeyA,
            ShortcutKey::E => Code::KeyE,
            ShortcutKey::O => Code::KeyO,
            ShortcutKey::Q => Code::KeyQ,
            ShortcutKey::S => Code::KeyS,
        }
    }

    fn egui_key(self) -> egui::Key {
        match self {
            ShortcutKey::A => egui::Key::A,
            ShortcutKey::E => egui::Key::E,
            ShortcutKey::O => egui::Key::O,
            ShortcutKey::Q => egui::Key::Q,
            ShortcutKey::S => egui::Key::S,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ShortcutKey::A => "A",
            ShortcutKey::E => "E",
            ShortcutKey::O => "O",
            ShortcutKey::Q => "Q",
            ShortcutKey::S => "S",
        }
    }
}

impl Shortcut {
    pub const fn new(key: ShortcutKey, ctrl: bool, shift: bool) -> Self {
        Self { key, ctrl, shift }
    }

    /// Convert to muda Accelerator
    pub fn to_muda_accelerator(&self) -> Accelerator {
        let mut modifiers = Modifiers::empty();
        if self.ctrl {
            #[cfg(target_os = "macos")]
            { modifiers |= Modifiers::META; }
            #[cfg(not(target_os = "macos"))]
            { modifiers |= Modifiers::CONTROL; }
        }
        if self.shift {
            modifiers |= Modifiers::SHIFT;
        }

        Accelerator::new(if modifiers.is_empty() { None } else { Some(modifiers) }, self.key.code())
    }

    /// Check if this shortcut matches the current egui input state
    pub fn matches_egui_input(&self, input: &egui::InputState) -> bool {
        // `command` is Cmd on macOS and Ctrl elsewhere
        if self.ctrl != input.modifiers.command {
            return false;
        }
        if self.shift != input.modifiers.shift {
            return false;
        }
        if input.modifiers.alt {
            return false;
        }

        input.key_pressed(self.key.egui_key())
    }

    /// Format shortcut for display (e.g., "Ctrl+S")
    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push(if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" });
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key.label());
        parts.join("+")
    }
}

/// All possible menu actions that can be triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    // File menu
    OpenKeyboard,
    OpenRecent(usize), // Index into recent folders list
    ClearRecent,
    SaveColors,
    Quit,

    // Edit menu
    ToggleEditMode,
    SelectAll,
    SelectNone,
}

/// Menu item definition
pub struct MenuItemDef {
    pub label: &'static str,
    pub action: MenuAction,
    pub shortcut: Option<Shortcut>,
}

/// Menu structure definition - can be an item, separator, or submenu
pub enum MenuDef {
    Item(&'static MenuItemDef),
    Separator,
    Submenu {
        label: &'static str,
        children: &'static [MenuDef],
    },
}

const CTRL: bool = true;
const SHIFT: bool = true;
const NO_SHIFT: bool = false;

const OPEN_RECENT_LABEL: &str = "Open Recent";

impl MenuItemDef {
    // File menu items
    const OPEN_KEYBOARD: Self = Self { label: "Open Keyboard...", action: MenuAction::OpenKeyboard, shortcut: Some(Shortcut::new(ShortcutKey::O, CTRL, NO_SHIFT)) };
    const SAVE_COLORS: Self = Self { label: "Save Colors", action: MenuAction::SaveColors, shortcut: Some(Shortcut::new(ShortcutKey::S, CTRL, NO_SHIFT)) };
    const QUIT: Self = Self { label: "Quit", action: MenuAction::Quit, shortcut: Some(Shortcut::new(ShortcutKey::Q, CTRL, NO_SHIFT)) };

    // Edit menu items
    const TOGGLE_EDIT: Self = Self { label: "Edit Colors", action: MenuAction::ToggleEditMode, shortcut: Some(Shortcut::new(ShortcutKey::E, CTRL, NO_SHIFT)) };
    const SELECT_ALL: Self = Self { label: "Select All", action: MenuAction::SelectAll, shortcut: Some(Shortcut::new(ShortcutKey::A, CTRL, NO_SHIFT)) };
    const SELECT_NONE: Self = Self { label: "Select None", action: MenuAction::SelectNone, shortcut: Some(Shortcut::new(ShortcutKey::A, CTRL, SHIFT)) };

    /// Get all menu items with shortcuts (for keyboard handling)
    pub fn all_with_shortcuts() -> &'static [&'static MenuItemDef] {
        &[
            &Self::OPEN_KEYBOARD, &Self::SAVE_COLORS, &Self::QUIT,
            &Self::TOGGLE_EDIT, &Self::SELECT_ALL, &Self::SELECT_NONE,
        ]
    }

    /// Get the complete menu structure definition
    pub const fn menu_structure() -> &'static [MenuDef] {
        &[
            MenuDef::Submenu {
                label: "File",
                children: &[
                    MenuDef::Item(&Self::OPEN_KEYBOARD),
                    MenuDef::Submenu {
                        label: OPEN_RECENT_LABEL,
                        children: &[],
                    },
                    MenuDef::Separator,
                    MenuDef::Item(&Self::SAVE_COLORS),
                    MenuDef::Separator,
                    MenuDef::Item(&Self::QUIT),
                ],
            },
            MenuDef::Submenu {
                label: "Edit",
                children: &[
                    MenuDef::Item(&Self::TOGGLE_EDIT),
                    MenuDef::Separator,
                    MenuDef::Item(&Self::SELECT_ALL),
                    MenuDef::Item(&Self::SELECT_NONE),
                ],
            },
        ]
    }
}

/// Label for the edit-mode toggle in the given mode
pub fn toggle_edit_label(mode: EditMode) -> &'static str {
    if mode.is_editing() {
        "Done Editing"
    } else {
        "Edit Colors"
    }
}

/// Whether an action is meaningful in the given mode
pub fn action_enabled(action: MenuAction, mode: EditMode) -> bool {
    match action {
        MenuAction::SaveColors | MenuAction::SelectAll | MenuAction::SelectNone => mode.is_editing(),
        _ => true,
    }
}

/// Menu system that holds all native menu items and can dispatch actions
pub struct MenuSystem {
    #[allow(dead_code)]
    menu: Menu,
    items: Vec<(MenuItem, MenuAction)>,
    /// Reference to "Open Recent" submenu for dynamic updates
    open_recent_submenu: Option<Submenu>,
}

impl MenuSystem {
    /// Create a new menu system with all menus and items
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let menu = Menu::new();
        let mut items = Vec::new();
        let mut open_recent_submenu: Option<Submenu> = None;

        for menu_def in MenuItemDef::menu_structure() {
            Self::build_submenu(&menu, menu_def, &mut items, &mut open_recent_submenu)?;
        }

        Ok(Self { menu, items, open_recent_submenu })
    }

    /// Build a top-level submenu and append to menu
    fn build_submenu(
        menu: &Menu,
        def: &MenuDef,
        items: &mut Vec<(MenuItem, MenuAction)>,
        open_recent_submenu: &mut Option<Submenu>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let MenuDef::Submenu { label, children } = def {
            let submenu = Submenu::new(*label, true);
            for child in *children {
                Self::build_menu_item(&submenu, child, items, open_recent_submenu)?;
            }
            menu.append(&submenu)?;
        }
        Ok(())
    }

    /// Recursively build menu items within a submenu
    fn build_menu_item(
        parent: &Submenu,
        def: &MenuDef,
        items: &mut Vec<(MenuItem, MenuAction)>,
        open_recent_submenu: &mut Option<Submenu>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match def {
            MenuDef::Item(item_def) => {
                let accelerator = item_def.shortcut.as_ref().map(|s| s.to_muda_accelerator());
                let item = MenuItem::new(item_def.label, true, accelerator);
                items.push((item.clone(), item_def.action));
                parent.append(&item)?;
            }
            MenuDef::Separator => {
                parent.append(&PredefinedMenuItem::separator())?;
            }
            MenuDef::Submenu { label, children } => {
                let submenu = Submenu::new(*label, true);
                if *label == OPEN_RECENT_LABEL {
                    *open_recent_submenu = Some(submenu.clone());
                }
                for child in *children {
                    Self::build_menu_item(&submenu, child, items, open_recent_submenu)?;
                }
                parent.append(&submenu)?;
            }
        }
        Ok(())
    }

    /// Update "Open Recent" submenu with the current recent folders
    pub fn update_recent_dirs(&mut self, recent_dirs: &[std::path::PathBuf]) {
        let Some(submenu) = &self.open_recent_submenu else {
            return;
        };

        while !submenu.items().is_empty() {
            let _ = submenu.remove_at(0);
        }
        self.items
            .retain(|(_, action)| !matches!(action, MenuAction::OpenRecent(_) | MenuAction::ClearRecent));

        for (index, path) in recent_dirs.iter().enumerate() {
            let item = MenuItem::new(folder_display_name(path), true, None);
            if submenu.append(&item).is_ok() {
                self.items.push((item, MenuAction::OpenRecent(index)));
            }
        }

        if !recent_dirs.is_empty() {
            let _ = submenu.append(&PredefinedMenuItem::separator());
        }

        let clear_item = MenuItem::new("Clear Recent", true, None);
        if submenu.append(&clear_item).is_ok() {
            self.items.push((clear_item, MenuAction::ClearRecent));
        }
    }

    /// Reflect the edit mode in item labels and enabled state
    pub fn update_for_mode(&self, mode: EditMode) {
        for (item, action) in &self.items {
            if *action == MenuAction::ToggleEditMode {
                item.set_text(toggle_edit_label(mode));
            }
            item.set_enabled(action_enabled(*action, mode));
        }
    }

    /// Initialize native menus for macOS (app-wide, doesn't require window handle)
    #[cfg(target_os = "macos")]
    pub fn init_for_macos(&self) {
        self.menu.init_for_nsapp();
    }

    /// Check if any menu item was triggered and return the action
    pub fn check_events(&self) -> Option<MenuAction> {
        let event = muda::MenuEvent::receiver().try_recv().ok()?;
        self.items
            .iter()
            .find(|(item, _)| event.id == *item.id())
            .map(|(_, action)| *action)
    }

    /// Check keyboard shortcuts from egui input and return the action
    pub fn check_shortcuts(input: &egui::InputState) -> Option<MenuAction> {
        MenuItemDef::all_with_shortcuts()
            .iter()
            .find(|def| def.shortcut.is_some_and(|s| s.matches_egui_input(input)))
            .map(|def| def.action)
    }

    /// Render egui menu bar from the same menu structure (for Linux/Windows)
    pub fn render_egui_menu_bar(
        ui: &mut egui::Ui,
        mode: EditMode,
        recent_dirs: &[std::path::PathBuf],
    ) -> Option<MenuAction> {
        let mut action = None;

        egui::menu::bar(ui, |ui| {
            for menu_def in MenuItemDef::menu_structure() {
                if let Some(a) = Self::render_menu_def(ui, menu_def, mode, recent_dirs) {
                    action = Some(a);
                }
            }
        });

        action
    }

    /// Recursively render a MenuDef as egui UI
    fn render_menu_def(
        ui: &mut egui::Ui,
        def: &MenuDef,
        mode: EditMode,
        recent_dirs: &[std::path::PathBuf],
    ) -> Option<MenuAction> {
        match def {
            MenuDef::Item(item_def) => {
                if Self::render_menu_item(ui, item_def, mode) {
                    Some(item_def.action)
                } else {
                    None
                }
            }
            MenuDef::Separator => {
                ui.separator();
                None
            }
            MenuDef::Submenu { label, children } => {
                let mut action = None;
                ui.menu_button(*label, |ui| {
                    if *label == OPEN_RECENT_LABEL {
                        for (index, path) in recent_dirs.iter().enumerate() {
                            if ui.button(folder_display_name(path)).clicked() {
                                action = Some(MenuAction::OpenRecent(index));
                                ui.close_menu();
                            }
                        }

                        if !recent_dirs.is_empty() {
                            ui.separator();
                        }

                        if ui.button("Clear Recent").clicked() {
                            action = Some(MenuAction::ClearRecent);
                            ui.close_menu();
                        }
                    } else {
                        for child in *children {
                            if let Some(a) = Self::render_menu_def(ui, child, mode, recent_dirs) {
                                action = Some(a);
                                ui.close_menu();
                            }
                        }
                    }
                });
                action
            }
        }
    }

    /// Render a single menu item with label and shortcut
    fn render_menu_item(ui: &mut egui::Ui, def: &MenuItemDef, mode: EditMode) -> bool {
        let label = if def.action == MenuAction::ToggleEditMode {
            toggle_edit_label(mode)
        } else {
            def.label
        };
        let enabled = action_enabled(def.action, mode);

        ui.set_min_width(180.0);

        match &def.shortcut {
            None => ui
                .add_enabled(enabled, egui::Button::new(label).min_size(egui::vec2(0.0, 0.0)))
                .clicked(),
            Some(shortcut) => ui
                .horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 20.0;

                    let button = ui.add_enabled(
                        enabled,
                        egui::Button::new(label).min_size(egui::vec2(0.0, 0.0)),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(shortcut.display()).weak().size(12.0));
                    });

                    button.clicked()
                })
                .inner,
        }
    }
}

fn folder_display_name(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}
