use std::collections::HashMap;

use crate::event::InputEvent;

/// Last known pressed/released state per button, used to turn the raw
/// event stream into press edges.
#[derive(Debug, Default)]
pub struct ButtonState {
    pressed: HashMap<u8, bool>,
}

impl ButtonState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event` and return its button number if it is a fresh press
    /// (released → pressed). Releases, repeats while held and non-button
    /// events return `None`.
    pub fn press_edge(&mut self, event: &InputEvent) -> Option<u8> {
        if !event.is_button() {
            return None;
        }
        let pressed = event.value == 1;
        let was_pressed = self.pressed.insert(event.number, pressed).unwrap_or(false);
        (pressed && !was_pressed).then_some(event.number)
    }

    #[cfg(test)]
    fn is_pressed(&self, button: u8) -> bool {
        self.pressed.get(&button).copied().unwrap_or(false)
    }
}
