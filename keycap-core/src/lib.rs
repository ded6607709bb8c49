// Keycap Core Library
// Keyboard diagram model, selection and edit-mode state

pub mod diagram;
pub mod registry;
pub mod selection;
pub mod mode;
pub mod shadow;
pub mod color;
pub mod hit_test;
pub mod assets;
pub mod keyboard;

pub use keyboard::KeyboardState;
