//! Entry triggers.
//!
//! A trigger is a world-placed object that starts a conversation: a
//! character the player walks up to, an access terminal, a ringing phone.
//! Triggers never touch session state; they ask the
//! [`ConversationEngine`](crate::ConversationEngine) through
//! [`TickContext::conversations`] and only advance their own flags when
//! the engine accepts.

use std::any::Any;

use cl_core::{Vec2, Volume};

use crate::context::TickContext;
use crate::conversation::{EntryMode, SessionId};
use crate::error::DialogueResult;
use crate::event::EventKind;

mod computer;
mod direct;
mod phone;
mod ring;

pub use computer::ComputerTrigger;
pub use direct::DirectTrigger;
pub use phone::PhoneTrigger;
pub use ring::RingLoop;

/// Something in the world that can start a conversation.
pub trait Trigger: std::fmt::Debug {
    /// Unique trigger name.
    fn name(&self) -> &str;

    /// Character this trigger talks to.
    fn character(&self) -> &str;

    /// Called once before the first tick.
    fn init(&mut self, _ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        Ok(())
    }

    /// Called once per tick, after the conversation engine.
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()>;

    /// Start ringing now, skipping proximity and delays. Triggers that do
    /// not ring ignore this.
    fn force_ring(&mut self, _ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        tracing::debug!(trigger = self.name(), "force ring ignored");
        Ok(())
    }

    /// Hand control to the conversation engine now, as if the player had
    /// completed the interaction.
    fn force_commit(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()>;

    /// Whether this trigger has successfully started its conversation.
    fn is_committed(&self) -> bool;

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to concrete types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Result of a proximity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeChange {
    Entered,
    Exited,
    Unchanged,
}

/// Tracks whether the player stands inside a trigger volume.
#[derive(Debug, Clone)]
pub(crate) struct Proximity {
    volume: Volume,
    require_range: bool,
    in_range: bool,
}

impl Proximity {
    pub(crate) fn new(volume: Volume, require_range: bool) -> Self {
        Self {
            volume,
            require_range,
            in_range: false,
        }
    }

    pub(crate) fn update(&mut self, player: Vec2) -> RangeChange {
        let inside = self.volume.contains(player);
        let change = match (self.in_range, inside) {
            (false, true) => RangeChange::Entered,
            (true, false) => RangeChange::Exited,
            _ => RangeChange::Unchanged,
        };
        self.in_range = inside;
        change
    }

    pub(crate) fn volume(&self) -> Volume {
        self.volume
    }

    pub(crate) fn in_range(&self) -> bool {
        self.in_range
    }

    pub(crate) fn requires_range(&self) -> bool {
        self.require_range
    }

    /// In range, or range is not required.
    pub(crate) fn eligible(&self) -> bool {
        self.in_range || !self.require_range
    }
}

/// Ask the engine to start `character`. Logs and records the outcome;
/// the caller only updates its own flags on `Some`.
pub(crate) fn commit(
    ctx: &mut TickContext<'_>,
    trigger: &str,
    character: &str,
    mode: EntryMode,
) -> Option<SessionId> {
    match ctx
        .conversations
        .start_conversation(&mut ctx.fx, character, mode)
    {
        Ok(id) => {
            tracing::info!(trigger, character, %mode, "trigger committed");
            ctx.fx.emit(
                EventKind::TriggerCommitted {
                    trigger: trigger.to_string(),
                    character: character.to_string(),
                },
                format!("{trigger}: started {character}"),
            );
            Some(id)
        }
        Err(err) => {
            tracing::warn!(trigger, character, "commit refused: {err}");
            ctx.fx.emit(
                EventKind::TriggerDenied {
                    trigger: trigger.to_string(),
                    character: character.to_string(),
                    reason: err.to_string(),
                },
                format!("{trigger}: {character} refused: {err}"),
            );
            None
        }
    }
}
