//! Boundary input events and their mapping to simulation actions
//!
//! Raw events may arrive in any phase; the state machine decides what sticks.

use serde::{Deserialize, Serialize};

use crate::sim::state::GameMode;
use crate::sim::tick::Action;

/// Minimum swipe travel in pixels; shorter gestures are taps
pub const SWIPE_THRESHOLD: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    /// Dominant direction of a drag vector (screen space, y grows downward)
    pub fn from_delta(dx: f32, dy: f32) -> Self {
        if dx.abs() > dy.abs() {
            if dx < 0.0 {
                SwipeDirection::Left
            } else {
                SwipeDirection::Right
            }
        } else if dy < 0.0 {
            SwipeDirection::Up
        } else {
            SwipeDirection::Down
        }
    }
}

/// Raw input as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// `KeyboardEvent.code`, e.g. "Space", "ArrowLeft"
    KeyDown(String),
    /// Pointer/tap position in surface pixels
    PointerDown { x: f32, y: f32 },
    Swipe {
        direction: SwipeDirection,
        magnitude: f32,
    },
}

impl InputEvent {
    /// Classify a touch start/end pair as a swipe or a tap
    pub fn from_touch(start: (f32, f32), end: (f32, f32)) -> Self {
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let magnitude = dx.hypot(dy);
        if magnitude >= SWIPE_THRESHOLD {
            InputEvent::Swipe {
                direction: SwipeDirection::from_delta(dx, dy),
                magnitude,
            }
        } else {
            InputEvent::PointerDown {
                x: start.0,
                y: start.1,
            }
        }
    }
}

/// What the engine should do with an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Action(Action),
    /// Leave the game (close the overlay)
    Close,
}

/// Map a raw event to a command. `surface_width` splits runner taps into thirds.
pub fn map_event(event: &InputEvent, mode: GameMode, surface_width: f32) -> Option<InputCommand> {
    match event {
        InputEvent::KeyDown(code) => map_key(code),
        InputEvent::PointerDown { x, .. } => {
            Some(InputCommand::Action(map_tap(*x, mode, surface_width)))
        }
        InputEvent::Swipe {
            direction,
            magnitude,
        } => {
            if *magnitude < SWIPE_THRESHOLD {
                return None;
            }
            let action = match (mode, direction) {
                (GameMode::Flappy, SwipeDirection::Up) => Action::Primary,
                (GameMode::Flappy, _) => return None,
                (GameMode::Runner, SwipeDirection::Up) => Action::Jump,
                (GameMode::Runner, SwipeDirection::Left) => Action::MoveLeft,
                (GameMode::Runner, SwipeDirection::Right) => Action::MoveRight,
                (GameMode::Runner, SwipeDirection::Down) => return None,
            };
            Some(InputCommand::Action(action))
        }
    }
}

fn map_key(code: &str) -> Option<InputCommand> {
    let action = match code {
        "Space" | "ArrowUp" | "KeyW" => Action::Primary,
        "ArrowLeft" | "KeyA" => Action::MoveLeft,
        "ArrowRight" | "KeyD" => Action::MoveRight,
        "Enter" | "KeyR" => Action::Restart,
        "Escape" => return Some(InputCommand::Close),
        _ => return None,
    };
    Some(InputCommand::Action(action))
}

fn map_tap(x: f32, mode: GameMode, width: f32) -> Action {
    if mode == GameMode::Flappy || !(width > 0.0) || !x.is_finite() {
        return Action::Primary;
    }
    let third = width / 3.0;
    if x < third {
        Action::MoveLeft
    } else if x > third * 2.0 {
        Action::MoveRight
    } else {
        Action::Primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(cmd: Option<InputCommand>) -> Option<Action> {
        match cmd {
            Some(InputCommand::Action(a)) => Some(a),
            _ => None,
        }
    }

    #[test]
    fn keys_map_to_actions() {
        let key = |c: &str| {
            action(map_event(&InputEvent::KeyDown(c.into()), GameMode::Runner, 300.0))
        };
        assert_eq!(key("Space"), Some(Action::Primary));
        assert_eq!(key("ArrowLeft"), Some(Action::MoveLeft));
        assert_eq!(key("KeyD"), Some(Action::MoveRight));
        assert_eq!(key("Enter"), Some(Action::Restart));
        assert_eq!(key("KeyQ"), None);
        assert_eq!(
            map_event(&InputEvent::KeyDown("Escape".into()), GameMode::Flappy, 300.0),
            Some(InputCommand::Close)
        );
    }

    #[test]
    fn runner_taps_split_in_thirds() {
        let tap = |x: f32| {
            let event = InputEvent::PointerDown { x, y: 10.0 };
            action(map_event(&event, GameMode::Runner, 300.0))
        };
        assert_eq!(tap(20.0), Some(Action::MoveLeft));
        assert_eq!(tap(150.0), Some(Action::Primary));
        assert_eq!(tap(280.0), Some(Action::MoveRight));
    }

    #[test]
    fn flappy_tap_anywhere_flaps() {
        let cmd = map_event(&InputEvent::PointerDown { x: 5.0, y: 5.0 }, GameMode::Flappy, 300.0);
        assert_eq!(action(cmd), Some(Action::Primary));
    }

    #[test]
    fn touch_pairs_become_swipes_or_taps() {
        assert_eq!(
            InputEvent::from_touch((100.0, 100.0), (40.0, 110.0)),
            InputEvent::Swipe {
                direction: SwipeDirection::Left,
                magnitude: (60.0f32).hypot(10.0)
            }
        );
        assert_eq!(
            InputEvent::from_touch((100.0, 100.0), (105.0, 95.0)),
            InputEvent::PointerDown { x: 100.0, y: 100.0 }
        );
        let up = InputEvent::Swipe {
            direction: SwipeDirection::Up,
            magnitude: 80.0,
        };
        assert_eq!(action(map_event(&up, GameMode::Runner, 300.0)), Some(Action::Jump));
    }

    #[test]
    fn short_swipe_ignored() {
        let nudge = InputEvent::Swipe {
            direction: SwipeDirection::Right,
            magnitude: 3.0,
        };
        assert_eq!(map_event(&nudge, GameMode::Runner, 300.0), None);
    }
}
