/// Logical gameplay actions produced by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Lane pressed.
    Hit { column: usize },
    /// Lane released.
    Release { column: usize },
    TogglePause,
    /// Start a new attempt of the same beatmap.
    Restart,
}

impl GameAction {
    /// Builds a lane action from a raw `(lane, pressed)` event.
    pub fn from_lane(column: usize, pressed: bool) -> Self {
        if pressed {
            GameAction::Hit { column }
        } else {
            GameAction::Release { column }
        }
    }
}
