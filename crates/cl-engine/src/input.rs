use cl_core::Vec2;

/// Player input polled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputFrame {
    /// The advance key went down this tick (edge, not level).
    pub advance: bool,
    /// Where the player stands.
    pub player: Vec2,
}

impl InputFrame {
    /// No key pressed, player at `player`.
    pub fn idle(player: Vec2) -> Self {
        Self {
            advance: false,
            player,
        }
    }

    /// Advance pressed, player at `player`.
    pub fn press(player: Vec2) -> Self {
        Self {
            advance: true,
            player,
        }
    }
}
