/// Theme system for the keycap editor
///
/// Parses CSS rules from assets/keys.css at runtime. Rules targeting the key
/// classes are resolved into a plain stylesheet that gets embedded in the
/// rendered keyboard SVG; other class/ID rules style the editor chrome.

use eframe::egui;
use keycap_core::color::KeyColor;
use keycap_core::diagram::KeyClasses;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
    System, // Follow system preference
}

/// Style properties that can be applied to UI elements
#[derive(Debug, Clone, Default)]
pub struct Style {
    pub background_color: Option<egui::Color32>,
    pub text_color: Option<egui::Color32>,
}

/// One CSS rule, declarations kept as `name: value` text
#[derive(Debug, Clone)]
struct CssRule {
    selector: String,
    declarations: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Theme {
    light_variables: HashMap<String, String>,
    dark_variables: HashMap<String, String>,
    rules: Vec<CssRule>,
    dark_rules: Vec<CssRule>,
    current_mode: ThemeMode,
}

impl Theme {
    /// Load theme from CSS text
    pub fn from_css(css: &str) -> Result<Self, String> {
        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("Failed to parse CSS: {:?}", e))?;

        let mut light_variables = HashMap::new();
        let mut dark_variables = HashMap::new();
        let mut rules = Vec::new();
        let mut dark_rules = Vec::new();

        for rule in &stylesheet.rules.0 {
            match rule {
                lightningcss::rules::CssRule::Style(style_rule) => {
                    for selector in selector_strings(style_rule) {
                        if selector.contains(":root") {
                            extract_css_variables(&style_rule.declarations, &mut light_variables)?;
                        } else if selector.starts_with('.') || selector.starts_with('#') {
                            rules.push(CssRule {
                                selector,
                                declarations: declaration_pairs(&style_rule.declarations)?,
                            });
                        }
                    }
                }
                lightningcss::rules::CssRule::Media(media_rule) => {
                    let media_str = media_rule
                        .query
                        .to_css_string(PrinterOptions::default())
                        .unwrap_or_default();

                    if !(media_str.contains("prefers-color-scheme") && media_str.contains("dark")) {
                        log::debug!("Ignoring media query: {}", media_str);
                        continue;
                    }

                    for inner_rule in &media_rule.rules.0 {
                        if let lightningcss::rules::CssRule::Style(style_rule) = inner_rule {
                            for selector in selector_strings(style_rule) {
                                if selector.contains(":root") {
                                    extract_css_variables(&style_rule.declarations, &mut dark_variables)?;
                                } else if selector.starts_with('.') || selector.starts_with('#') {
                                    dark_rules.push(CssRule {
                                        selector,
                                        declarations: declaration_pairs(&style_rule.declarations)?,
                                    });
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            light_variables,
            dark_variables,
            rules,
            dark_rules,
            current_mode: ThemeMode::System,
        })
    }

    /// Load theme from embedded CSS file
    pub fn load_default() -> Result<Self, String> {
        let css = include_str!("../assets/keys.css");
        Self::from_css(css)
    }

    /// Set the current theme mode
    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.current_mode = mode;
    }

    /// Whether dark styles apply for this frame
    pub fn is_dark(&self, ctx: &egui::Context) -> bool {
        match self.current_mode {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => ctx.style().visuals.dark_mode,
        }
    }

    /// Variables in effect (dark values override light ones)
    fn variables(&self, dark: bool) -> HashMap<String, String> {
        let mut vars = self.light_variables.clone();
        if dark {
            vars.extend(self.dark_variables.clone());
        }
        vars
    }

    /// Rules in effect, in cascade order
    fn active_rules(&self, dark: bool) -> impl Iterator<Item = &CssRule> {
        let dark_rules: &[CssRule] = if dark { &self.dark_rules } else { &[] };
        self.rules.iter().chain(dark_rules.iter())
    }

    /// Plain stylesheet for the rules that target key classes, with every
    /// `var()` resolved (the SVG rasterizer does not support custom properties)
    pub fn key_stylesheet(&self, classes: &KeyClasses, dark: bool) -> String {
        let vars = self.variables(dark);
        let class_names = [&classes.normal, &classes.editing, &classes.selected, &classes.shadow];

        let mut css = String::new();
        for rule in self.active_rules(dark) {
            let targets_keys = class_names
                .iter()
                .any(|class| selector_has_class(&rule.selector, class));
            if !targets_keys {
                continue;
            }
            css.push_str(&rule.selector);
            css.push_str(" {");
            for (name, value) in &rule.declarations {
                css.push(' ');
                css.push_str(name);
                css.push_str(": ");
                css.push_str(&resolve_vars(value, &vars));
                css.push(';');
            }
            css.push_str(" }\n");
        }
        css
    }

    /// Get style for a selector (e.g., ".toolbar" or "#status")
    pub fn style(&self, selector: &str, ctx: &egui::Context) -> Style {
        let dark = self.is_dark(ctx);
        let vars = self.variables(dark);

        let mut style = Style::default();
        for rule in self.active_rules(dark).filter(|rule| rule.selector == selector) {
            for (name, value) in &rule.declarations {
                let value = resolve_vars(value, &vars);
                match name.as_str() {
                    "background-color" => style.background_color = KeyColor::to_egui(&value),
                    "color" => style.text_color = KeyColor::to_egui(&value),
                    _ => {}
                }
            }
        }
        style
    }

    /// Get the number of loaded rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if theme has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn selector_strings(style_rule: &lightningcss::rules::style::StyleRule) -> Vec<String> {
    style_rule
        .selectors
        .0
        .iter()
        .filter_map(|s| s.to_css_string(PrinterOptions::default()).ok())
        .map(|s| s.trim().to_string())
        .collect()
}

/// Whether `.class` appears in the selector as a whole class name
fn selector_has_class(selector: &str, class: &str) -> bool {
    let needle = format!(".{}", class);
    selector.match_indices(&needle).any(|(index, _)| {
        selector[index + needle.len()..]
            .chars()
            .next()
            .map(|c| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(true)
    })
}

/// Extract CSS custom properties (--variables) from declarations
fn extract_css_variables(
    declarations: &lightningcss::declaration::DeclarationBlock,
    variables: &mut HashMap<String, String>,
) -> Result<(), String> {
    for property in &declarations.declarations {
        if let lightningcss::properties::Property::Custom(_) = property {
            let property_css = property
                .to_css_string(false, PrinterOptions::default())
                .map_err(|e| format!("Failed to serialize property: {:?}", e))?;

            if let Some((name, value)) = property_css.split_once(':') {
                let name = name.trim().strip_prefix("--").unwrap_or(name.trim()).to_string();
                variables.insert(name, value.trim().to_string());
            }
        }
    }
    Ok(())
}

/// Serialize declarations into `(name, value)` pairs, var() left unresolved
fn declaration_pairs(
    declarations: &lightningcss::declaration::DeclarationBlock,
) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    for property in &declarations.declarations {
        let prop_str = property
            .to_css_string(false, PrinterOptions::default())
            .map_err(|e| format!("Failed to serialize property: {:?}", e))?;

        if let Some((name, value)) = prop_str.split_once(':') {
            pairs.push((
                name.trim().to_string(),
                value.trim().trim_end_matches(';').to_string(),
            ));
        }
    }
    Ok(pairs)
}

/// Replace every `var(--name)` / `var(--name, fallback)` in a value
fn resolve_vars(value: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::new();
    let mut rest = value;
    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let Some(end) = closing_paren(rest) else {
            // Unclosed var() is left as written
            out.push_str(rest);
            return out;
        };
        let inner = &rest[4..end];
        let (name, fallback) = match inner.split_once(',') {
            Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
            None => (inner.trim(), None),
        };
        let name = name.strip_prefix("--").unwrap_or(name);
        match (variables.get(name), fallback) {
            (Some(resolved), _) => out.push_str(resolved),
            (None, Some(fallback)) => out.push_str(&resolve_vars(fallback, variables)),
            (None, None) => log::warn!("Undefined CSS variable --{}", name),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Byte index of the `)` closing the first `(` in `s`
fn closing_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
