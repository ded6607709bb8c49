//! Selection state management
//!
//! Tracks the selected key visuals for color editing.

use crate::registry::KeyCode;

/// Selected keys, in the order they were selected
///
/// Mutation is crate-private: `KeyboardState` updates the set together with
/// the highlight class on the key visual so the two never drift apart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected_keys: Vec<KeyCode>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self {
            selected_keys: Vec::new(),
        }
    }

    /// Add a key; returns false if it was already selected
    pub(crate) fn add(&mut self, code: KeyCode) -> bool {
        if self.selected_keys.contains(&code) {
            return false;
        }
        self.selected_keys.push(code);
        true
    }

    /// Remove a key; returns false if it was not selected
    pub(crate) fn remove(&mut self, code: &str) -> bool {
        let before = self.selected_keys.len();
        self.selected_keys.retain(|k| k.as_str() != code);
        self.selected_keys.len() != before
    }

    /// Drain every selected key, oldest first
    pub(crate) fn take_all(&mut self) -> Vec<KeyCode> {
        std::mem::take(&mut self.selected_keys)
    }

    /// Check if a key is selected
    pub fn contains(&self, code: &str) -> bool {
        self.selected_keys.iter().any(|k| k.as_str() == code)
    }

    pub fn is_empty(&self) -> bool {
        self.selected_keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected_keys.len()
    }

    /// Get the selected keys in selection order
    pub fn keys(&self) -> &[KeyCode] {
        &self.selected_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_creation() {
        let selection = Selection::new();
        assert!(selection.is_empty());
        assert_eq!(selection.len(), 0);
    }

    #[test]
    fn test_add_remove() {
        let mut selection = Selection::new();

        assert!(selection.add(KeyCode::new("KeyA")));
        assert!(selection.add(KeyCode::new("KeyB")));
        assert!(!selection.add(KeyCode::new("KeyA")));
        assert_eq!(selection.len(), 2);

        assert!(selection.remove("KeyA"));
        assert!(!selection.remove("KeyA"));
        assert!(!selection.contains("KeyA"));
        assert!(selection.contains("KeyB"));
    }

    #[test]
    fn test_keeps_selection_order() {
        let mut selection = Selection::new();
        selection.add(KeyCode::new("KeyC"));
        selection.add(KeyCode::new("KeyA"));
        selection.add(KeyCode::new("KeyB"));

        let keys: Vec<&str> = selection.keys().iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["KeyC", "KeyA", "KeyB"]);

        let drained = selection.take_all();
        assert_eq!(drained.len(), 3);
        assert!(selection.is_empty());
    }
}
