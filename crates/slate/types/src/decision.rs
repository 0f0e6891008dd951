//! Swipe directions, decisions, and session mode

use serde::{Deserialize, Serialize};

/// Which ledger a session writes to.
///
/// `Real` decisions are durable and may promote billets onto the slate.
/// `Sandbox` is a practice space; its decisions never touch applications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Real,
    Sandbox,
}

impl Mode {
    pub fn is_real(&self) -> bool {
        matches!(self, Mode::Real)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Real => write!(f, "real"),
            Mode::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// A directional verdict recorded against a billet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Not interested.
    Nope,
    /// Interested.
    Like,
    /// Strongly interested; the promote intent.
    Super,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Nope => write!(f, "nope"),
            Decision::Like => write!(f, "like"),
            Decision::Super => write!(f, "super"),
        }
    }
}

/// The raw gesture coming from the card stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    /// Promote intent.
    Up,
    /// Defer for later review.
    Down,
}

impl SwipeDirection {
    /// The decision this gesture records, if any. `Down` records nothing.
    pub fn decision(&self) -> Option<Decision> {
        match self {
            SwipeDirection::Left => Some(Decision::Nope),
            SwipeDirection::Right => Some(Decision::Like),
            SwipeDirection::Up => Some(Decision::Super),
            SwipeDirection::Down => None,
        }
    }

    pub fn is_promote(&self) -> bool {
        matches!(self, SwipeDirection::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_decision() {
        assert_eq!(SwipeDirection::Left.decision(), Some(Decision::Nope));
        assert_eq!(SwipeDirection::Right.decision(), Some(Decision::Like));
        assert_eq!(SwipeDirection::Up.decision(), Some(Decision::Super));
        assert_eq!(SwipeDirection::Down.decision(), None);
    }

    #[test]
    fn test_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Super).unwrap(), "\"super\"");
        assert_eq!(serde_json::to_string(&Mode::Sandbox).unwrap(), "\"sandbox\"");
        let dir: SwipeDirection = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(dir, SwipeDirection::Up);
    }
}
