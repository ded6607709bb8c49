/// Maps egui keys to W3C `KeyboardEvent.code` strings ("KeyA", "Digit1", ...)
/// which are the ids used by keyboard diagrams.
///
/// egui does not report modifier keys as key events, so Shift/Control/Alt/Meta
/// never produce a code here.

use eframe::egui::Key;
use muda::accelerator::Code;

/// Physical key code for an egui key, if the key has one
pub fn key_code(key: Key) -> Option<String> {
    to_code(key).map(|code| code.to_string())
}

fn to_code(key: Key) -> Option<Code> {
    let code = match key {
        Key::A => Code::KeyA,
        Key::B => Code::KeyB,
        Key::C => Code::KeyC,
        Key::D => Code::KeyD,
        Key::E => Code::KeyE,
        Key::F => Code::KeyF,
        Key::G => Code::KeyG,
        Key::H => Code::KeyH,
        Key::I => Code::KeyI,
        Key::J => Code::KeyJ,
        Key::K => Code::KeyK,
        Key::L => Code::KeyL,
        Key::M => Code::KeyM,
        Key::N => Code::KeyN,
        Key::O => Code::KeyO,
        Key::P => Code::KeyP,
        Key::Q => Code::KeyQ,
        Key::R => Code::KeyR,
        Key::S => Code::KeyS,
        Key::T => Code::KeyT,
        Key::U => Code::KeyU,
        Key::V => Code::KeyV,
        Key::W => Code::KeyW,
        Key::X => Code::KeyX,
        Key::Y => Code::KeyY,
        Key::Z => Code::KeyZ,

        Key::Num0 => Code::Digit0,
        Key::Num1 => Code::Digit1,
        Key::Num2 => Code::Digit2,
        Key::Num3 => Code::Digit3,
        Key::Num4 => Code::Digit4,
        Key::Num5 => Code::Digit5,
        Key::Num6 => Code::Digit6,
        Key::Num7 => Code::Digit7,
        Key::Num8 => Code::Digit8,
        Key::Num9 => Code::Digit9,

        Key::F1 => Code::F1,
        Key::F2 => Code::F2,
        Key::F3 => Code::F3,
        Key::F4 => Code::F4,
        Key::F5 => Code::F5,
        Key::F6 => Code::F6,
        Key::F7 => Code::F7,
        Key::F8 => Code::F8,
        Key::F9 => Code::F9,
        Key::F10 => Code::F10,
        Key::F11 => Code::F11,
        Key::F12 => Code::F12,

        Key::ArrowDown => Code::ArrowDown,
        Key::ArrowLeft => Code::ArrowLeft,
        Key::ArrowRight => Code::ArrowRight,
        Key::ArrowUp => Code::ArrowUp,

        Key::Escape => Code::Escape,
        Key::Tab => Code::Tab,
        Key::Backspace => Code::Backspace,
        Key::Enter => Code::Enter,
        Key::Space => Code::Space,
        Key::Insert => Code::Insert,
        Key::Delete => Code::Delete,
        Key::Home => Code::Home,
        Key::End => Code::End,
        Key::PageUp => Code::PageUp,
        Key::PageDown => Code::PageDown,

        // Punctuation, named after the US layout position
        Key::Backtick => Code::Backquote,
        Key::Minus => Code::Minus,
        Key::Equals | Key::Plus => Code::Equal,
        Key::OpenBracket | Key::OpenCurlyBracket => Code::BracketLeft,
        Key::CloseBracket | Key::CloseCurlyBracket => Code::BracketRight,
        Key::Backslash | Key::Pipe => Code::Backslash,
        Key::Semicolon | Key::Colon => Code::Semicolon,
        Key::Quote => Code::Quote,
        Key::Comma => Code::Comma,
        Key::Period => Code::Period,
        Key::Slash | Key::Questionmark => Code::Slash,

        _ => return None,
    };
    Some(code)
}
