/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MouseLeft,
    MouseMiddle,
    MouseRight,
    Shift,
    Control,
    Escape,
}

/// Controller - pointer and button state read by the orbit controls
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Pointer movement in logical pixels since the last reset
    fn pointer_delta(&self) -> (f32, f32);

    /// Wheel movement since the last reset, positive = away from the user
    fn scroll_delta(&self) -> f32;
}
