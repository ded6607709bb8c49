//! Integration tests for selection operations
//!
//! Tests multi-key selection through the keyboard state, and that selection
//! membership and the highlight class never disagree.

use keycap_core::assets::parse_keyboard;
use keycap_core::mode::EditMode;
use keycap_core::KeyboardState;

const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 60">
  <g id="KeyA"><rect x="0" y="0" width="50" height="50" fill="#ffffff"/></g>
  <g id="KeyB"><rect x="60" y="0" width="50" height="50" fill="#ffffff"/></g>
  <g id="KeyC"><rect x="120" y="0" width="50" height="50" fill="#ffffff"/></g>
  <g id="Escape"><rect x="180" y="0" width="50" height="50" fill="#ffffff"/></g>
</svg>"##;

const CODES: &str = r#"{"KeyA": true, "KeyB": true, "KeyC": true, "Escape": false}"#;

const COLORS: &str = r##"{
  "KeyA": {"color": "#00ff00"},
  "KeyB": {"color": "#00ff00"},
  "KeyC": {"color": "#00ff00"},
  "Escape": {"color": "#ff0000"}
}"##;

/// Create a keyboard already in editing mode
fn setup_editing_keyboard() -> KeyboardState {
    let loaded = parse_keyboard(SVG, CODES, COLORS).expect("fixture should parse");
    let mut keyboard = KeyboardState::from_loaded(loaded);
    keyboard.toggle_edit();
    keyboard
}

/// Selection membership and highlight class agree for every key in the diagram
fn assert_selection_matches_classes(keyboard: &KeyboardState) {
    for code in ["KeyA", "KeyB", "KeyC", "Escape"] {
        let highlighted = keyboard
            .diagram()
            .element(code)
            .map(|key| key.has_class("selectedKeys"))
            .unwrap_or(false);
        assert_eq!(
            highlighted,
            keyboard.is_selected(code),
            "selection and highlight disagree for {}",
            code
        );
    }
}

#[test]
fn test_click_toggles_selection() {
    let mut keyboard = setup_editing_keyboard();

    assert!(keyboard.click("KeyA"));
    assert!(keyboard.is_selected("KeyA"));
    assert_selection_matches_classes(&keyboard);

    assert!(keyboard.click("KeyA"));
    assert!(!keyboard.is_selected("KeyA"));
    assert_selection_matches_classes(&keyboard);
}

#[test]
fn test_select_item_is_idempotent() {
    let mut keyboard = setup_editing_keyboard();

    assert!(keyboard.select_item("KeyB", true));
    assert!(!keyboard.select_item("KeyB", true));
    assert_eq!(keyboard.selection().len(), 1);
    assert_eq!(
        keyboard.diagram().element("KeyB").unwrap().attribute("class"),
        Some("selectedKeys")
    );

    assert!(keyboard.select_item("KeyB", false));
    assert!(!keyboard.select_item("KeyB", false));
    assert!(keyboard.selection().is_empty());
    assert_selection_matches_classes(&keyboard);
}

#[test]
fn test_inactive_keys_cannot_be_selected() {
    let mut keyboard = setup_editing_keyboard();

    assert!(!keyboard.click("Escape"));
    assert!(!keyboard.select_item("Escape", true));
    assert!(!keyboard.select_item("KeyZ", true));
    assert!(keyboard.selection().is_empty());
    assert_selection_matches_classes(&keyboard);
}

#[test]
fn test_select_all_then_none() {
    let mut keyboard = setup_editing_keyboard();

    keyboard.select_all(true);
    assert_eq!(keyboard.selection().len(), 3);
    assert!(!keyboard.is_selected("Escape"));
    assert_selection_matches_classes(&keyboard);

    keyboard.select_all(false);
    assert!(keyboard.selection().is_empty());
    assert_selection_matches_classes(&keyboard);
}

#[test]
fn test_selection_order_follows_clicks() {
    let mut keyboard = setup_editing_keyboard();

    keyboard.click("KeyC");
    keyboard.click("KeyA");
    keyboard.select_all(true);

    let order: Vec<&str> = keyboard.selection().keys().iter().map(|k| k.as_str()).collect();
    assert_eq!(order, vec!["KeyC", "KeyA", "KeyB"]);
}

#[test]
fn test_leaving_editing_clears_selection() {
    let mut keyboard = setup_editing_keyboard();

    keyboard.click("KeyA");
    keyboard.click("KeyB");
    assert_eq!(keyboard.selection().len(), 2);

    keyboard.toggle_edit();
    assert_eq!(keyboard.mode(), EditMode::Normal);
    assert!(keyboard.selection().is_empty());
    assert_selection_matches_classes(&keyboard);

    // Clicks are not routed in normal mode
    assert!(!keyboard.click("KeyA"));
    assert!(keyboard.selection().is_empty());
}
