use clap::Parser;
use eframe::egui;
use keycap_core::assets::{load_keyboard, parse_keyboard};
use keycap_core::color::KeyColor;
use keycap_core::KeyboardState;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

mod config;
use config::AppConfig;

mod keymap;

mod panes;
use panes::{PaneRenderer, SharedPaneState};

mod menu;
use menu::{MenuAction, MenuSystem};

mod theme;
use theme::{Theme, ThemeMode};

/// Keycap Editor - keyboard diagram viewer and keycap color customizer
#[derive(Parser, Debug)]
#[command(name = "Keycap Editor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Keyboard asset folder (containing SVG/keys.svg and JSON/*.JSON)
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Use light theme
    #[arg(long, conflicts_with = "dark")]
    light: bool,

    /// Use dark theme
    #[arg(long, conflicts_with = "light")]
    dark: bool,
}

/// Keyboard bundled with the editor, used when no asset folder is configured
const BUNDLED_SVG: &str = include_str!("../assets/keyboard/SVG/keys.svg");
const BUNDLED_CODES: &str = include_str!("../assets/keyboard/JSON/codes.JSON");
const BUNDLED_DATA: &str = include_str!("../assets/keyboard/JSON/data.JSON");

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let theme_mode = if args.light {
        ThemeMode::Light
    } else if args.dark {
        ThemeMode::Dark
    } else {
        ThemeMode::System
    };

    let mut theme = Theme::load_default().expect("Failed to load theme");
    theme.set_mode(theme_mode);
    log::info!("Loaded theme with {} rules (mode: {:?})", theme.len(), theme_mode);
    if theme.is_empty() {
        log::warn!("Theme has no rules; keys will render unstyled");
    }

    let config = AppConfig::load();

    // Command line folder wins over the configured one
    let (keyboard, asset_dir) = match args.assets.or_else(|| config.asset_dir.clone()) {
        Some(dir) => match load_keyboard(&dir) {
            Ok(loaded) => (KeyboardState::from_loaded(loaded), Some(dir)),
            Err(e) => {
                log::warn!("{}; using bundled keyboard", e);
                (bundled_keyboard(), None)
            }
        },
        None => (bundled_keyboard(), None),
    };

    #[cfg(target_os = "macos")]
    {
        if let Ok(menu_system) = MenuSystem::new() {
            menu_system.init_for_macos();
            log::info!("Native macOS menus initialized");
        }
    }

    let viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 720.0])
        .with_title(window_title(asset_dir.as_deref()))
        .with_app_id("keycap-editor"); // Set app_id for Wayland

    let options = eframe::NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        "Keycap Editor",
        options,
        Box::new(move |_cc| Ok(Box::new(KeycapApp::new(keyboard, asset_dir, theme, config)))),
    )
}

fn bundled_keyboard() -> KeyboardState {
    let loaded = parse_keyboard(BUNDLED_SVG, BUNDLED_CODES, BUNDLED_DATA)
        .expect("Failed to parse bundled keyboard");
    log::info!("Loaded bundled keyboard ({} active keys)", loaded.registry.active_count());
    KeyboardState::from_loaded(loaded)
}

fn window_title(asset_dir: Option<&Path>) -> String {
    match asset_dir.and_then(|dir| dir.file_name()).and_then(|name| name.to_str()) {
        Some(name) => format!("Keycap Editor - {}", name),
        None => "Keycap Editor".to_string(),
    }
}

struct KeycapApp {
    keyboard: KeyboardState,
    asset_dir: Option<PathBuf>,
    theme: Theme,
    config: AppConfig,
    menu_system: Option<MenuSystem>, // Native menu system for event checking
    toolbar: panes::toolbar::ToolbarPane,
    stage: panes::stage::StagePane,
    picker_color: egui::Color32,
    /// Physical keys currently shadowed, released on focus loss
    held_keys: HashSet<String>,
    status: String,
}

impl KeycapApp {
    fn new(keyboard: KeyboardState, asset_dir: Option<PathBuf>, theme: Theme, config: AppConfig) -> Self {
        let mut menu_system = MenuSystem::new().ok();
        if let Some(menu_system) = &mut menu_system {
            menu_system.update_recent_dirs(&config.get_recent_asset_dirs());
            menu_system.update_for_mode(keyboard.mode());
        }

        let picker_color = KeyColor::to_egui(&config.default_color).unwrap_or_else(|| {
            log::warn!("Invalid default color {:?}, using red", config.default_color);
            egui::Color32::RED
        });

        Self {
            keyboard,
            asset_dir,
            theme,
            config,
            menu_system,
            toolbar: panes::toolbar::ToolbarPane::new(),
            stage: panes::stage::StagePane::new(),
            picker_color,
            held_keys: HashSet::new(),
            status: String::new(),
        }
    }

    fn handle_menu_action(&mut self, ctx: &egui::Context, action: MenuAction) {
        log::debug!("Menu action: {:?}", action);
        match action {
            MenuAction::OpenKeyboard => {
                let mut dialog = rfd::FileDialog::new().set_title("Open Keyboard Folder");
                if let Some(dir) = &self.asset_dir {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(dir) = dialog.pick_folder() {
                    self.open_keyboard(ctx, dir);
                }
            }
            MenuAction::OpenRecent(index) => {
                let recent = self.config.get_recent_asset_dirs();
                match recent.get(index) {
                    Some(dir) => self.open_keyboard(ctx, dir.clone()),
                    None => log::warn!("Recent folder {} no longer exists", index),
                }
            }
            MenuAction::ClearRecent => {
                self.config.clear_recent_asset_dirs();
                self.refresh_menu();
            }
            MenuAction::SaveColors => {
                let saved = self.keyboard.snapshot_colors();
                self.status = format!("Saved colors for {} keys", saved);
            }
            MenuAction::Quit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            MenuAction::ToggleEditMode => {
                self.release_held_keys();
                self.keyboard.toggle_edit();
                self.status = format!("{} mode", self.keyboard.mode().display_name());
                self.refresh_menu();
            }
            MenuAction::SelectAll => {
                self.keyboard.select_all(true);
            }
            MenuAction::SelectNone => {
                self.keyboard.select_all(false);
            }
        }
    }

    /// Replace the keyboard with the one in `dir`, keeping the current one on failure
    fn open_keyboard(&mut self, ctx: &egui::Context, dir: PathBuf) {
        match load_keyboard(&dir) {
            Ok(loaded) => {
                self.keyboard = KeyboardState::from_loaded(loaded);
                self.held_keys.clear();
                self.stage.recenter();
                self.status = format!("Opened {}", dir.display());
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(window_title(Some(&dir))));

                self.config.asset_dir = Some(dir.clone());
                self.config.add_recent_asset_dir(dir.clone());
                self.asset_dir = Some(dir);
                self.refresh_menu();
            }
            Err(e) => {
                log::error!("{}", e);
                self.status = e;
            }
        }
    }

    fn refresh_menu(&mut self) {
        if let Some(menu_system) = &mut self.menu_system {
            menu_system.update_recent_dirs(&self.config.get_recent_asset_dirs());
            menu_system.update_for_mode(self.keyboard.mode());
        }
    }

    /// Route physical key presses and releases to the keyboard state
    fn handle_key_events(&mut self, ctx: &egui::Context) {
        let typing = ctx.wants_keyboard_input();
        let events = ctx.input(|i| i.events.clone());

        for event in events {
            match event {
                egui::Event::Key { key, physical_key, pressed, repeat, modifiers, .. } => {
                    let Some(code) = keymap::key_code(physical_key.unwrap_or(key)) else {
                        continue;
                    };

                    if pressed {
                        // Command combos are shortcuts, not key presses
                        if repeat || typing || modifiers.command || modifiers.ctrl {
                            continue;
                        }
                        if self.keyboard.key_down(&code) {
                            self.held_keys.insert(code);
                        }
                    } else if self.held_keys.remove(&code) {
                        self.keyboard.key_up(&code);
                    }
                }
                egui::Event::WindowFocused(false) => {
                    self.release_held_keys();
                }
                _ => {}
            }
        }
    }

    fn release_held_keys(&mut self) {
        for code in self.held_keys.drain() {
            self.keyboard.key_up(&code);
        }
    }
}

impl eframe::App for KeycapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ctrl+Plus/Minus would fight with the stage zoom
        ctx.options_mut(|o| {
            o.zoom_with_keyboard = false;
        });

        // Check for native menu events (macOS)
        if let Some(action) = self.menu_system.as_ref().and_then(|m| m.check_events()) {
            self.handle_menu_action(ctx, action);
        }

        if let Some(action) = ctx.input(MenuSystem::check_shortcuts) {
            if menu::action_enabled(action, self.keyboard.mode()) {
                self.handle_menu_action(ctx, action);
            }
        }

        self.handle_key_events(ctx);

        // Native menus already cover macOS
        #[cfg(not(target_os = "macos"))]
        {
            let mode = self.keyboard.mode();
            let recent = self.config.get_recent_asset_dirs();
            let mut menu_action = None;
            egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
                menu_action = MenuSystem::render_egui_menu_bar(ui, mode, &recent);
            });
            if let Some(action) = menu_action {
                self.handle_menu_action(ctx, action);
            }
        }

        let mut pending_action: Option<MenuAction> = None;

        {
            let mut shared = SharedPaneState {
                keyboard: &mut self.keyboard,
                theme: &self.theme,
                config: &self.config,
                picker_color: &mut self.picker_color,
                pending_action: &mut pending_action,
                status: &mut self.status,
            };

            let toolbar = &mut self.toolbar;
            egui::SidePanel::left("toolbar")
                .resizable(false)
                .exact_width(self.config.picker_width + 24.0)
                .show(ctx, |ui| {
                    let rect = ui.max_rect();
                    toolbar.render_content(ui, rect, &mut shared);
                });

            let stage = &mut self.stage;
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    let rect = ui.available_rect_before_wrap();
                    stage.render_content(ui, rect, &mut shared);
                });
        }

        // Execute pane-requested actions after rendering
        if let Some(action) = pending_action {
            self.handle_menu_action(ctx, action);
        }
    }
}
