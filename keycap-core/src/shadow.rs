//! Pressed-key shadow layer
//!
//! A shadow is a clone of the key's primary shape, appended to the key visual
//! and tagged with the shadow class. Only active keys get shadows.

use crate::diagram::{KeyClasses, KeyDiagram};
use crate::registry::KeyRegistry;

/// Whether the key visual currently carries a shadow shape
pub fn has_shadow(diagram: &KeyDiagram, classes: &KeyClasses, code: &str) -> bool {
    diagram
        .element(code)
        .map(|key| key.child_elements().any(|child| child.has_class(&classes.shadow)))
        .unwrap_or(false)
}

/// Add a shadow under an active key
///
/// Returns true if a shadow was created. A key that already has one, or has
/// no primary shape, is left alone.
pub fn show_shadow(
    diagram: &mut KeyDiagram,
    registry: &KeyRegistry,
    classes: &KeyClasses,
    code: &str,
) -> bool {
    if !registry.is_active(code) || has_shadow(diagram, classes, code) {
        return false;
    }
    let Some(key) = diagram.element_mut(code) else {
        return false;
    };
    let Some(primary) = key.first_shape(&classes.shadow) else {
        return false;
    };

    let mut shadow = primary.clone();
    shadow.children.clear();
    shadow.remove_attribute("id");
    shadow.add_class(&classes.shadow);
    key.append_child(shadow);
    true
}

/// Remove the shadow from an active key
///
/// Returns true if a shadow was removed; a missing shadow is a no-op.
pub fn hide_shadow(
    diagram: &mut KeyDiagram,
    registry: &KeyRegistry,
    classes: &KeyClasses,
    code: &str,
) -> bool {
    if !registry.is_active(code) {
        return false;
    }
    diagram
        .element_mut(code)
        .and_then(|key| key.remove_child_where(|child| child.has_class(&classes.shadow)))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (KeyDiagram, KeyRegistry) {
        let diagram = KeyDiagram::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <g id="KeyA"><rect width="10" height="10" fill="#00ff00"/></g>
                <g id="KeyB"><rect width="10" height="10" fill="#0000ff"/></g>
            </svg>"##,
        )
        .unwrap();
        let registry = KeyRegistry::from_json(r#"{"KeyA": true, "KeyB": false}"#, "{}").unwrap();
        (diagram, registry)
    }

    #[test]
    fn test_show_twice_leaves_one_shadow() {
        let (mut diagram, registry) = fixture();
        let classes = KeyClasses::default();

        assert!(show_shadow(&mut diagram, &registry, &classes, "KeyA"));
        assert!(!show_shadow(&mut diagram, &registry, &classes, "KeyA"));

        let key = diagram.element("KeyA").unwrap();
        assert_eq!(key.child_elements().count(), 2);
        let shadows = key.child_elements().filter(|c| c.has_class("shadowKeys")).count();
        assert_eq!(shadows, 1);
    }

    #[test]
    fn test_shadow_clones_primary_shape() {
        let (mut diagram, registry) = fixture();
        let classes = KeyClasses::default();
        show_shadow(&mut diagram, &registry, &classes, "KeyA");

        let key = diagram.element("KeyA").unwrap();
        let shadow = key.child_elements().last().unwrap();
        assert_eq!(shadow.name, "rect");
        assert_eq!(shadow.attribute("fill"), Some("#00ff00"));
        assert_eq!(shadow.attribute("class"), Some("shadowKeys"));
    }

    #[test]
    fn test_hide_without_shadow_is_noop() {
        let (mut diagram, registry) = fixture();
        let classes = KeyClasses::default();
        let before = diagram.clone();

        assert!(!hide_shadow(&mut diagram, &registry, &classes, "KeyA"));
        assert_eq!(diagram, before);

        show_shadow(&mut diagram, &registry, &classes, "KeyA");
        assert!(hide_shadow(&mut diagram, &registry, &classes, "KeyA"));
        assert_eq!(diagram, before);
    }

    #[test]
    fn test_inactive_and_unknown_keys_ignored() {
        let (mut diagram, registry) = fixture();
        let classes = KeyClasses::default();
        let before = diagram.clone();

        assert!(!show_shadow(&mut diagram, &registry, &classes, "KeyB"));
        assert!(!show_shadow(&mut diagram, &registry, &classes, "Escape"));
        assert!(!hide_shadow(&mut diagram, &registry, &classes, "Escape"));
        assert_eq!(diagram, before);
    }
}
