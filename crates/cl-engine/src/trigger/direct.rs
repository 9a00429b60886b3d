use std::any::Any;
use std::time::Duration;

use cl_core::{Cue, Volume};

use super::{Proximity, Trigger, commit};
use crate::config::TriggerTimings;
use crate::context::TickContext;
use crate::conversation::EntryMode;
use crate::error::DialogueResult;
use crate::timer::Timer;

/// Face-to-face conversation: press advance next to the character.
///
/// Fires at most once. A refused attempt leaves the trigger ready for
/// another press.
#[derive(Debug, Clone)]
pub struct DirectTrigger {
    name: String,
    character: String,
    proximity: Proximity,
    enter_cue: Option<Cue>,
    settle: Duration,
    pending: Option<Timer>,
    fired: bool,
}

impl DirectTrigger {
    /// A trigger over `volume` that talks to `character`.
    pub fn new(
        name: impl Into<String>,
        character: impl Into<String>,
        volume: Volume,
        timings: &TriggerTimings,
    ) -> Self {
        Self {
            name: name.into(),
            character: character.into(),
            proximity: Proximity::new(volume, true),
            enter_cue: None,
            settle: timings.direct_settle,
            pending: None,
            fired: false,
        }
    }

    /// Whether the player must stand inside the volume.
    pub fn with_require_range(mut self, require: bool) -> Self {
        self.proximity = Proximity::new(self.proximity.volume(), require);
        self
    }

    /// Sound played on the press that starts the conversation.
    pub fn with_enter_cue(mut self, cue: Cue) -> Self {
        self.enter_cue = Some(cue);
        self
    }

    /// Whether the player is inside the volume.
    pub fn in_range(&self) -> bool {
        self.proximity.in_range()
    }

    /// Whether a press is waiting out the settle delay.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn attempt(&mut self, ctx: &mut TickContext<'_>) {
        self.pending = None;
        if commit(ctx, &self.name, &self.character, EntryMode::Direct).is_some() {
            self.fired = true;
        }
    }
}

impl Trigger for DirectTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn character(&self) -> &str {
        &self.character
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        self.proximity.update(ctx.player);
        if self.fired {
            return Ok(());
        }

        if let Some(timer) = self.pending.as_mut() {
            if timer.tick(ctx.dt) {
                self.attempt(ctx);
            }
            return Ok(());
        }

        if self.proximity.eligible() && ctx.consume_advance() {
            if let Some(cue) = &self.enter_cue {
                ctx.fx.stage.play_once(&cue.channel, &cue.clip);
            }
            tracing::debug!(trigger = %self.name, "talk pressed");
            self.pending = Some(Timer::new(self.settle));
        }
        Ok(())
    }

    fn force_commit(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        if self.fired {
            tracing::debug!(trigger = %self.name, "already fired");
            return Ok(());
        }
        self.attempt(ctx);
        Ok(())
    }

    fn is_committed(&self) -> bool {
        self.fired
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
