use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::{
    game::GameEvent,
    input::{Axis, AxisBindings, AxisHandler, Button, ButtonBindings, ButtonHandler},
};

/// Logical input state sampled once per update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Input {
    pub x: Axis,
    pub y: Axis,
    pub quit: Button,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputBindings {
    pub x: AxisBindings,
    pub y: AxisBindings,
    pub quit: ButtonBindings,
}

#[derive(Debug, Default)]
pub struct InputHandler {
    x: AxisHandler,
    y: AxisHandler,
    quit: ButtonHandler,
}

impl InputHandler {
    pub fn new(bindings: &InputBindings) -> Self {
        Self {
            x: AxisHandler::new(&bindings.x),
            y: AxisHandler::new(&bindings.y),
            quit: ButtonHandler::new(&bindings.quit),
        }
    }

    pub fn event(&mut self, event: &GameEvent) {
        self.x.event(event);
        self.y.event(event);
        self.quit.event(event);
    }

    pub fn next_state(&mut self) -> Input {
        Input {
            x: self.x.next_state(),
            y: self.y.next_state(),
            quit: self.quit.next_state(),
        }
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            x: AxisBindings {
                positive: ButtonBindings {
                    keys: HashSet::from_iter([KeyCode::ArrowRight, KeyCode::KeyD]),
                },
                negative: ButtonBindings {
                    keys: HashSet::from_iter([KeyCode::ArrowLeft, KeyCode::KeyA]),
                },
            },
            // Screen y grows downward.
            y: AxisBindings {
                positive: ButtonBindings {
                    keys: HashSet::from_iter([KeyCode::ArrowDown, KeyCode::KeyS]),
                },
                negative: ButtonBindings {
                    keys: HashSet::from_iter([KeyCode::ArrowUp, KeyCode::KeyW]),
                },
            },
            quit: ButtonBindings {
                keys: HashSet::from_iter([KeyCode::Escape]),
            },
        }
    }
}
