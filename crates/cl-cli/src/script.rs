//! Input scripts for `comlink play`.
//!
//! One command per line; `#` starts a comment.
//!
//! ```text
//! move 4 0          # player position
//! wait 0.5          # idle for half a second
//! press             # one frame with the advance key down
//! start Apollo direct
//! advance
//! force-advance
//! end
//! ring desk_phone
//! commit desk_phone
//! ```

use std::time::Duration;

use cl_core::Vec2;
use cl_engine::EntryMode;

/// One scripted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Idle frames covering this span.
    Wait(Duration),
    /// Move the player.
    Move(Vec2),
    /// One frame with the advance key pressed.
    Press,
    /// Start a conversation without a trigger.
    Start(String, EntryMode),
    /// Call `advance_or_skip` directly.
    Advance,
    /// Call `force_advance`.
    ForceAdvance,
    /// End the active conversation.
    End,
    /// Force a trigger to ring.
    Ring(String),
    /// Force a trigger to commit.
    Commit(String),
}

/// Parse a script. Errors name the offending line.
pub fn parse(text: &str) -> Result<Vec<Step>, String> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_line(line).map_err(|e| format!("line {}: {e}", index + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["wait", secs] => {
            let secs = number(secs)?;
            Duration::try_from_secs_f64(secs)
                .map(Step::Wait)
                .map_err(|_| format!("invalid duration '{secs}'"))
        }
        ["move", x, y] => Ok(Step::Move(Vec2::new(number(x)?, number(y)?))),
        ["press"] => Ok(Step::Press),
        ["start", name, mode] => {
            let mode = match *mode {
                "direct" => EntryMode::Direct,
                "computer" => EntryMode::Computer,
                other => return Err(format!("unknown mode '{other}' (expected direct or computer)")),
            };
            Ok(Step::Start((*name).to_string(), mode))
        }
        ["advance"] => Ok(Step::Advance),
        ["force-advance"] => Ok(Step::ForceAdvance),
        ["end"] => Ok(Step::End),
        ["ring", name] => Ok(Step::Ring((*name).to_string())),
        ["commit", name] => Ok(Step::Commit((*name).to_string())),
        _ => Err(format!("unrecognised command '{line}'")),
    }
}

fn number(word: &str) -> Result<f64, String> {
    word.parse()
        .map_err(|_| format!("expected a number, found '{word}'"))
}
