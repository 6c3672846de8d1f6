use serde::{Deserialize, Serialize};

/// A steering intent. The desktop app binds these to the arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

/// A discrete control axis: -1, 0 or +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Axis {
    pub fn value(self) -> f32 {
        match self {
            Self::Negative => -1.0,
            Self::Neutral => 0.0,
            Self::Positive => 1.0,
        }
    }
}

/// Raw key transition. `Released` carries the key only for logging; any
/// release has the same effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(Direction),
    Released(Option<Direction>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_values() {
        assert_eq!(Axis::Negative.value(), -1.0);
        assert_eq!(Axis::Neutral.value(), 0.0);
        assert_eq!(Axis::Positive.value(), 1.0);
        assert_eq!(Axis::default(), Axis::Neutral);
    }

    #[test]
    fn release_of_unbound_key_is_representable() {
        let e = KeyEvent::Released(None);
        assert!(matches!(e, KeyEvent::Released(None)));
    }
}
