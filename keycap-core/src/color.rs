//! Key color application
//!
//! Pushes color values onto the primary shape of key visuals, and moves
//! colors between the rendered diagram and the registry's color records.
//! Color strings are passed through untouched; whatever the rasterizer makes
//! of a malformed value is what the user sees.

use crate::diagram::{KeyClasses, KeyDiagram};
use crate::registry::KeyRegistry;

/// Hex color helpers for the color picker boundary
pub struct KeyColor;

impl KeyColor {
    /// Format an egui color as `#rrggbb` (or `#rrggbbaa` when translucent)
    pub fn from_egui(color: egui::Color32) -> String {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into an egui color
    pub fn to_egui(value: &str) -> Option<egui::Color32> {
        let hex = value.trim().strip_prefix('#')?;
        // Byte slicing below needs single-byte chars
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1].repeat(2))?;
                let g = channel(&hex[1..2].repeat(2))?;
                let b = channel(&hex[2..3].repeat(2))?;
                Some(egui::Color32::from_rgb(r, g, b))
            }
            6 => Some(egui::Color32::from_rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Some(egui::Color32::from_rgba_unmultiplied(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }
}

/// Rendered fill of a key's primary shape
pub fn rendered_color<'a>(diagram: &'a KeyDiagram, classes: &KeyClasses, code: &str) -> Option<&'a str> {
    diagram
        .element(code)?
        .first_shape(&classes.shadow)?
        .attribute("fill")
}

/// Set the fill of an active key's primary shape
///
/// Returns false for inactive or unknown keys and keys without a shape.
pub fn apply_color(
    diagram: &mut KeyDiagram,
    registry: &KeyRegistry,
    classes: &KeyClasses,
    code: &str,
    color: &str,
) -> bool {
    if !registry.is_active(code) {
        return false;
    }
    match diagram
        .element_mut(code)
        .and_then(|key| key.first_shape_mut(&classes.shadow))
    {
        Some(shape) => {
            shape.set_attribute("fill", color);
            true
        }
        None => false,
    }
}

/// Commit every active key's rendered fill into its color record
///
/// Returns the number of records written.
pub fn snapshot_colors(diagram: &KeyDiagram, registry: &mut KeyRegistry, classes: &KeyClasses) -> usize {
    let rendered: Vec<(String, String)> = registry
        .active_keys()
        .filter_map(|code| {
            rendered_color(diagram, classes, code.as_str())
                .map(|color| (code.as_str().to_string(), color.to_string()))
        })
        .collect();

    for (code, color) in &rendered {
        registry.set_color(code, color);
    }
    rendered.len()
}

/// Apply every active key's stored color to its rendered fill
///
/// Keys without a stored color keep whatever fill they have. Returns the
/// number of keys painted.
pub fn restore_colors(diagram: &mut KeyDiagram, registry: &KeyRegistry, classes: &KeyClasses) -> usize {
    let mut painted = 0;
    for code in registry.active_keys() {
        match registry.color(code.as_str()) {
            Some(color) => {
                if apply_color(diagram, registry, classes, code.as_str(), color) {
                    painted += 1;
                }
            }
            None => log::debug!("No stored color for active key {}", code),
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (KeyDiagram, KeyRegistry) {
        let diagram = KeyDiagram::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <g id="KeyA"><rect width="10" height="10" fill="#ffffff"/></g>
                <g id="KeyB"><rect width="10" height="10" fill="#ffffff"/></g>
                <g id="KeyC"><rect width="10" height="10" fill="#ffffff"/></g>
            </svg>"##,
        )
        .unwrap();
        let registry = KeyRegistry::from_json(
            r#"{"KeyA": true, "KeyB": true, "KeyC": false}"#,
            r##"{"KeyA": {"color": "#00ff00"}, "KeyC": {"color": "#ff0000"}}"##,
        )
        .unwrap();
        (diagram, registry)
    }

    #[test]
    fn test_hex_conversion() {
        assert_eq!(KeyColor::from_egui(egui::Color32::from_rgb(0x12, 0x34, 0x56)), "#123456");
        assert_eq!(KeyColor::to_egui("#123456"), Some(egui::Color32::from_rgb(0x12, 0x34, 0x56)));
        assert_eq!(KeyColor::to_egui("#f00"), Some(egui::Color32::from_rgb(255, 0, 0)));
        assert_eq!(KeyColor::to_egui("red"), None);
        assert_eq!(KeyColor::to_egui("#12345"), None);
    }

    #[test]
    fn test_hex_rejects_non_ascii() {
        // Byte lengths match valid forms but char boundaries don't
        assert_eq!(KeyColor::to_egui("#aé"), None);
        assert_eq!(KeyColor::to_egui("#aéaaa"), None);
        assert_eq!(KeyColor::to_egui("#+f+f+f"), None);
    }

    #[test]
    fn test_apply_color_only_active() {
        let (mut diagram, registry) = fixture();
        let classes = KeyClasses::default();

        assert!(apply_color(&mut diagram, &registry, &classes, "KeyA", "#123456"));
        assert_eq!(rendered_color(&diagram, &classes, "KeyA"), Some("#123456"));

        assert!(!apply_color(&mut diagram, &registry, &classes, "KeyC", "#123456"));
        assert_eq!(rendered_color(&diagram, &classes, "KeyC"), Some("#ffffff"));

        assert!(!apply_color(&mut diagram, &registry, &classes, "Escape", "#123456"));
    }

    #[test]
    fn test_color_not_validated() {
        let (mut diagram, registry) = fixture();
        let classes = KeyClasses::default();
        assert!(apply_color(&mut diagram, &registry, &classes, "KeyA", "not-a-color"));
        assert_eq!(rendered_color(&diagram, &classes, "KeyA"), Some("not-a-color"));
    }

    #[test]
    fn test_restore_then_snapshot() {
        let (mut diagram, mut registry) = fixture();
        let classes = KeyClasses::default();

        // KeyB has no stored color, KeyC is inactive
        assert_eq!(restore_colors(&mut diagram, &registry, &classes), 1);
        assert_eq!(rendered_color(&diagram, &classes, "KeyA"), Some("#00ff00"));
        assert_eq!(rendered_color(&diagram, &classes, "KeyB"), Some("#ffffff"));
        assert_eq!(rendered_color(&diagram, &classes, "KeyC"), Some("#ffffff"));

        apply_color(&mut diagram, &registry, &classes, "KeyB", "#0000ff");
        assert_eq!(snapshot_colors(&diagram, &mut registry, &classes), 2);
        assert_eq!(registry.color("KeyB"), Some("#0000ff"));
        assert_eq!(registry.color("KeyC"), Some("#ff0000"));
    }
}
