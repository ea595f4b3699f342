//! Input injection boundary.
//!
//! The engine decides where to click; the host decides how the synthetic
//! events reach the client. Cursor movement takes an opaque speed profile so
//! the transport can shape human-plausible motion curves.

use ochre_core::Point;

/// Human-motion parameter for cursor travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedProfile {
    Fast,
    Medium,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

/// Synthetic mouse/keyboard transport.
pub trait InputDriver: Send + Sync {
    fn move_cursor(&self, target: Point, speed: SpeedProfile) -> anyhow::Result<()>;
    fn click(&self, button: MouseButton) -> anyhow::Result<()>;
    fn send_key(&self, action: KeyAction, key_code: u16) -> anyhow::Result<()>;
    fn scroll(&self, delta: i32) -> anyhow::Result<()>;
}

/// Moves to `target` and left-clicks, the combination every targeting
/// component ends with.
pub fn click_at<I: InputDriver + ?Sized>(
    input: &I,
    target: Point,
    speed: SpeedProfile,
) -> anyhow::Result<()> {
    input.move_cursor(target, speed)?;
    input.click(MouseButton::Left)
}
