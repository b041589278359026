use std::collections::{HashMap, HashSet};

use winit::keyboard::KeyCode;

use crate::game::GameEvent;

/// Sampled state of one logical button for a single update.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Button {
    pub is_held: bool,
    pub is_pressed: bool,
    pub is_released: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonBindings {
    pub keys: HashSet<KeyCode>,
}

/// Tracks every key bound to one button as a bit, so the button stays held
/// while any binding is.
#[derive(Debug, Default)]
pub(in crate::input) struct ButtonHandler {
    key_indices: HashMap<KeyCode, u8>,
    held_bindings: u32,
    is_pressed: bool,
    was_held: bool,
}

impl ButtonHandler {
    pub fn new(bindings: &ButtonBindings) -> Self {
        let key_indices = bindings
            .keys
            .iter()
            .copied()
            .enumerate()
            .map(|(index, code)| (code, index as u8))
            .collect();

        Self {
            key_indices,
            held_bindings: 0,
            is_pressed: false,
            was_held: false,
        }
    }

    pub fn event(&mut self, event: &GameEvent) {
        let GameEvent::Key { code, is_held } = event else {
            return;
        };

        let Some(index) = self.key_indices.get(code) else {
            return;
        };

        let binding_mask = 1u32 << index;
        let binding_was_held = self.held_bindings & binding_mask != 0;

        if *is_held && !binding_was_held {
            self.is_pressed = true;
        }

        self.held_bindings =
            (self.held_bindings & !binding_mask) | (binding_mask * *is_held as u32);
    }

    pub fn next_state(&mut self) -> Button {
        let state = Button {
            is_held: self.held_bindings != 0,
            is_pressed: self.is_pressed,
            is_released: self.was_held && self.held_bindings == 0,
        };

        self.was_held = state.is_held;
        self.is_pressed = false;

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(code: KeyCode) -> ButtonHandler {
        ButtonHandler::new(&ButtonBindings {
            keys: HashSet::from_iter([code]),
        })
    }

    fn key(code: KeyCode, is_held: bool) -> GameEvent {
        GameEvent::Key { code, is_held }
    }

    #[test]
    fn press_hold_release_transitions() {
        let mut handler = handler(KeyCode::Space);

        handler.event(&key(KeyCode::Space, true));
        let state = handler.next_state();
        assert!(state.is_pressed && state.is_held && !state.is_released);

        let state = handler.next_state();
        assert!(!state.is_pressed && state.is_held && !state.is_released);

        handler.event(&key(KeyCode::Space, false));
        let state = handler.next_state();
        assert!(!state.is_pressed && !state.is_held && state.is_released);

        let state = handler.next_state();
        assert!(!state.is_pressed && !state.is_held && !state.is_released);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut handler = handler(KeyCode::Space);

        handler.event(&key(KeyCode::KeyQ, true));

        assert!(!handler.next_state().is_held);
    }

    #[test]
    fn press_between_updates_is_not_lost() {
        let mut handler = handler(KeyCode::Space);

        // Tap fully inside one update window.
        handler.event(&key(KeyCode::Space, true));
        handler.event(&key(KeyCode::Space, false));

        let state = handler.next_state();
        assert!(state.is_pressed && !state.is_held);
    }
}
