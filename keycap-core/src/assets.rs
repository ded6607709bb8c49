//! Keyboard asset loading
//!
//! An asset folder holds three files:
//! - `SVG/keys.svg` - the keyboard diagram, one `<g id="KeyCode">` per key
//! - `JSON/codes.JSON` - key identifier to active flag
//! - `JSON/data.JSON` - key identifier to `{"color": "#rrggbb"}` record
//!
//! The diagram must be parsed before the tables are applied, since
//! initialization addresses key visuals by identifier.

use crate::diagram::KeyDiagram;
use crate::registry::KeyRegistry;
use std::path::{Path, PathBuf};

/// Diagram path relative to the asset folder
pub const SVG_FILE: &str = "SVG/keys.svg";
/// Key list path relative to the asset folder
pub const LIST_FILE: &str = "JSON/codes.JSON";
/// Color data path relative to the asset folder
pub const DATA_FILE: &str = "JSON/data.JSON";

/// Resolved file locations for one keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub svg: PathBuf,
    pub codes: PathBuf,
    pub data: PathBuf,
}

impl AssetPaths {
    /// Resolve the standard layout inside `dir`
    ///
    /// The JSON files are also found with a lower-case `.json` extension.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            svg: dir.join(SVG_FILE),
            codes: with_json_fallback(dir.join(LIST_FILE)),
            data: with_json_fallback(dir.join(DATA_FILE)),
        }
    }
}

fn with_json_fallback(path: PathBuf) -> PathBuf {
    if path.exists() {
        return path;
    }
    let lower = path.with_extension("json");
    if lower.exists() {
        lower
    } else {
        path
    }
}

/// A parsed keyboard, ready to become a `KeyboardState`
#[derive(Debug, Clone)]
pub struct LoadedKeyboard {
    pub diagram: KeyDiagram,
    pub registry: KeyRegistry,
}

/// Parse a keyboard from in-memory sources
pub fn parse_keyboard(svg: &str, codes_json: &str, data_json: &str) -> Result<LoadedKeyboard, String> {
    let diagram = KeyDiagram::parse(svg)?;
    let registry = KeyRegistry::from_json(codes_json, data_json)?;

    let missing: Vec<&str> = registry
        .active_keys()
        .map(|code| code.as_str())
        .filter(|code| diagram.element(code).is_none())
        .collect();
    if !missing.is_empty() {
        log::warn!("Active keys missing from diagram: {}", missing.join(", "));
    }

    Ok(LoadedKeyboard { diagram, registry })
}

/// Load a keyboard from an asset folder
pub fn load_keyboard(dir: &Path) -> Result<LoadedKeyboard, String> {
    let paths = AssetPaths::in_dir(dir);
    let svg = read_file(&paths.svg)?;
    let codes = read_file(&paths.codes)?;
    let data = read_file(&paths.data)?;

    let keyboard = parse_keyboard(&svg, &codes, &data)
        .map_err(|e| format!("{}: {}", dir.display(), e))?;
    log::info!(
        "Loaded keyboard from {} ({} keys, {} active)",
        dir.display(),
        keyboard.registry.len(),
        keyboard.registry.active_count()
    );
    Ok(keyboard)
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"><g id="KeyA"><rect width="1" height="1"/></g></svg>"##;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("keycap-assets-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("SVG")).unwrap();
        std::fs::create_dir_all(dir.join("JSON")).unwrap();
        dir
    }

    #[test]
    fn test_parse_keyboard() {
        let keyboard = parse_keyboard(SVG, r#"{"KeyA": true}"#, r##"{"KeyA": {"color": "#00ff00"}}"##).unwrap();
        assert!(keyboard.diagram.element("KeyA").is_some());
        assert!(keyboard.registry.is_active("KeyA"));
    }

    #[test]
    fn test_parse_keyboard_errors() {
        assert!(parse_keyboard("<svg", "{}", "{}").is_err());
        assert!(parse_keyboard(SVG, "[", "{}").is_err());
    }

    #[test]
    fn test_load_keyboard_from_dir() {
        let dir = temp_dir("load");
        std::fs::write(dir.join(SVG_FILE), SVG).unwrap();
        std::fs::write(dir.join("JSON/codes.json"), r#"{"KeyA": true}"#).unwrap();
        std::fs::write(dir.join(DATA_FILE), r##"{"KeyA": {"color": "#00ff00"}}"##).unwrap();

        let keyboard = load_keyboard(&dir).unwrap();
        assert_eq!(keyboard.registry.color("KeyA"), Some("#00ff00"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_keyboard_missing_file() {
        let dir = temp_dir("missing");
        let err = load_keyboard(&dir).unwrap_err();
        assert!(err.contains("keys.svg"), "unexpected error: {}", err);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
