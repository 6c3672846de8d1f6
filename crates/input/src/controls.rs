use crate::action::{Axis, Direction, KeyEvent};

/// Steering intent for one frame.
///
/// `forward` is throttle (+1 ahead, -1 astern). `turn` is rudder (+1 turns
/// left, -1 turns right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub forward: Axis,
    pub turn: Axis,
}

impl InputSnapshot {
    pub fn is_idle(&self) -> bool {
        self.forward == Axis::Neutral && self.turn == Axis::Neutral
    }
}

/// Folds key events into the current steering intent.
///
/// A press sets its own axis and leaves the other alone. Any release clears
/// both axes, so letting go of one of two held keys stops the boat entirely.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    current: InputSnapshot,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(Direction::Forward) => self.current.forward = Axis::Positive,
            KeyEvent::Pressed(Direction::Backward) => self.current.forward = Axis::Negative,
            KeyEvent::Pressed(Direction::Left) => self.current.turn = Axis::Positive,
            KeyEvent::Pressed(Direction::Right) => self.current.turn = Axis::Negative,
            KeyEvent::Released(key) => {
                if !self.current.is_idle() {
                    tracing::trace!(?key, "key released, controls cleared");
                }
                self.current = InputSnapshot::default();
            }
        }
    }

    /// Intent to hand to this frame's update.
    pub fn snapshot(&self) -> InputSnapshot {
        self.current
    }
}
