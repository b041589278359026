use crate::{
    game::GameEvent,
    input::{Button, ButtonBindings, ButtonHandler},
};

/// Paired positive/negative buttons read as a -1..1 axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Axis {
    pub positive: Button,
    pub negative: Button,
}

impl Axis {
    pub fn value(&self) -> f32 {
        self.positive.is_held as i32 as f32 - self.negative.is_held as i32 as f32
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisBindings {
    pub positive: ButtonBindings,
    pub negative: ButtonBindings,
}

#[derive(Debug, Default)]
pub(in crate::input) struct AxisHandler {
    positive: ButtonHandler,
    negative: ButtonHandler,
}

impl AxisHandler {
    pub fn new(bindings: &AxisBindings) -> Self {
        Self {
            positive: ButtonHandler::new(&bindings.positive),
            negative: ButtonHandler::new(&bindings.negative),
        }
    }

    pub fn event(&mut self, event: &GameEvent) {
        self.positive.event(event);
        self.negative.event(event);
    }

    pub fn next_state(&mut self) -> Axis {
        Axis {
            positive: self.positive.next_state(),
            negative: self.negative.next_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use winit::keyboard::KeyCode;

    use super::*;

    #[test]
    fn opposing_buttons_cancel_out() {
        let mut handler = AxisHandler::new(&AxisBindings {
            positive: ButtonBindings {
                keys: HashSet::from_iter([KeyCode::ArrowRight]),
            },
            negative: ButtonBindings {
                keys: HashSet::from_iter([KeyCode::ArrowLeft]),
            },
        });

        assert_eq!(handler.next_state().value(), 0.0);

        handler.event(&GameEvent::Key {
            code: KeyCode::ArrowRight,
            is_held: true,
        });
        assert_eq!(handler.next_state().value(), 1.0);

        handler.event(&GameEvent::Key {
            code: KeyCode::ArrowLeft,
            is_held: true,
        });
        assert_eq!(handler.next_state().value(), 0.0);

        handler.event(&GameEvent::Key {
            code: KeyCode::ArrowRight,
            is_held: false,
        });
        assert_eq!(handler.next_state().value(), -1.0);
    }
}
