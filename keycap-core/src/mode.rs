/// Edit mode for the keyboard
///
/// Normal mode routes physical keypresses to the shadow renderer; editing
/// mode routes pointer clicks to the selection model instead.

use crate::diagram::KeyClasses;
use serde::{Deserialize, Serialize};

/// Which set of inputs the keyboard responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditMode {
    /// Keys react to physical keypresses with a pressed shadow
    #[default]
    Normal,
    /// Keys react to clicks and can be selected and recolored
    Editing,
}

impl EditMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Normal => EditMode::Editing,
            EditMode::Editing => EditMode::Normal,
        }
    }

    pub fn is_editing(self) -> bool {
        self == EditMode::Editing
    }

    /// Get display name for the mode
    pub fn display_name(self) -> &'static str {
        match self {
            EditMode::Normal => "Normal",
            EditMode::Editing => "Editing",
        }
    }

    /// Class applied to the diagram root in this mode
    pub fn root_class(self, classes: &KeyClasses) -> &str {
        match self {
            EditMode::Normal => &classes.normal,
            EditMode::Editing => &classes.editing,
        }
    }

    /// Input routes that are live in this mode
    pub fn routes(self) -> InputRoutes {
        match self {
            EditMode::Normal => InputRoutes {
                key_shadows: true,
                click_select: false,
            },
            EditMode::Editing => InputRoutes {
                key_shadows: false,
                click_select: true,
            },
        }
    }
}

/// Event subscriptions switched on and off by mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRoutes {
    /// Physical key-down/key-up drive the shadow renderer
    pub key_shadows: bool,
    /// Clicks on active keys toggle their selection
    pub click_select: bool,
}

impl Default for InputRoutes {
    fn default() -> Self {
        EditMode::default().routes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(EditMode::default(), EditMode::Normal);
        assert_eq!(EditMode::Normal.toggled(), EditMode::Editing);
        assert_eq!(EditMode::Editing.toggled(), EditMode::Normal);
    }

    #[test]
    fn test_routes_are_exclusive() {
        let normal = EditMode::Normal.routes();
        assert!(normal.key_shadows && !normal.click_select);

        let editing = EditMode::Editing.routes();
        assert!(!editing.key_shadows && editing.click_select);
    }

    #[test]
    fn test_root_class() {
        let classes = KeyClasses::default();
        assert_eq!(EditMode::Normal.root_class(&classes), "normalKeys");
        assert_eq!(EditMode::Editing.root_class(&classes), "editingModeKeys");
    }
}
