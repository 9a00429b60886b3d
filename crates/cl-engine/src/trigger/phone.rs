use std::any::Any;

use cl_core::{Cue, Volume};

use super::{Proximity, RangeChange, RingLoop, Trigger, commit};
use crate::config::TriggerTimings;
use crate::context::TickContext;
use crate::conversation::EntryMode;
use crate::error::DialogueResult;

/// A phone that rings when the player comes near and connects a call
/// when answered.
///
/// Once ringing, the phone keeps ringing wherever the player goes and
/// can be answered from anywhere.
#[derive(Debug, Clone)]
pub struct PhoneTrigger {
    name: String,
    character: String,
    proximity: Proximity,
    ring: Option<RingLoop>,
    enter_cue: Option<Cue>,
    ring_attempted: bool,
    committed: bool,
}

impl PhoneTrigger {
    /// A phone over `volume`. Without [`with_ring`](Self::with_ring) it
    /// never rings and only connects through `force_ring`/`force_commit`.
    pub fn new(name: impl Into<String>, character: impl Into<String>, volume: Volume) -> Self {
        Self {
            name: name.into(),
            character: character.into(),
            proximity: Proximity::new(volume, true),
            ring: None,
            enter_cue: None,
            ring_attempted: false,
            committed: false,
        }
    }

    /// Ring with `cue`, pausing `timings.ring_interval` between rings.
    pub fn with_ring(mut self, cue: Cue, timings: &TriggerTimings) -> Self {
        self.ring = Some(RingLoop::new(cue, timings.ring_interval));
        self
    }

    /// When false the phone starts ringing on the first tick instead of
    /// when the player enters the volume.
    pub fn with_require_range(mut self, require: bool) -> Self {
        self.proximity = Proximity::new(self.proximity.volume(), require);
        self
    }

    /// Sound played when the call is answered.
    pub fn with_enter_cue(mut self, cue: Cue) -> Self {
        self.enter_cue = Some(cue);
        self
    }

    /// Whether the phone is ringing.
    pub fn is_ringing(&self) -> bool {
        self.ring.as_ref().is_some_and(RingLoop::is_ringing)
    }

    /// The ring loop, if the phone has a ring tone.
    pub fn ring(&self) -> Option<&RingLoop> {
        self.ring.as_ref()
    }

    fn start_ringing(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        match self.ring.as_mut() {
            Some(ring) => ring.start(&mut ctx.fx, &self.name),
            None => Ok(()),
        }
    }

    fn answer(&mut self, ctx: &mut TickContext<'_>) {
        if commit(ctx, &self.name, &self.character, EntryMode::Direct).is_none() {
            return;
        }
        if let Some(ring) = self.ring.as_mut() {
            ring.cancel(&mut ctx.fx, &self.name);
        }
        if let Some(cue) = &self.enter_cue {
            ctx.fx.stage.play_once(&cue.channel, &cue.clip);
        }
        self.committed = true;
    }
}

impl Trigger for PhoneTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn character(&self) -> &str {
        &self.character
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        let change = self.proximity.update(ctx.player);
        if self.committed {
            return Ok(());
        }

        let wants_ring = change == RangeChange::Entered
            || (!self.proximity.requires_range() && !self.ring_attempted);
        if wants_ring && !self.is_ringing() {
            self.ring_attempted = true;
            self.start_ringing(ctx)?;
        }
        if let Some(ring) = self.ring.as_mut() {
            ring.tick(&mut ctx.fx, &self.name, ctx.dt);
        }

        if self.is_ringing() && ctx.consume_advance() {
            tracing::info!(trigger = %self.name, "answering");
            self.answer(ctx);
        }
        Ok(())
    }

    fn force_ring(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        if self.committed {
            tracing::debug!(trigger = %self.name, "call already connected");
            return Ok(());
        }
        if self.ring.is_none() {
            tracing::debug!(trigger = %self.name, "no ring tone; connecting directly");
            self.answer(ctx);
            return Ok(());
        }
        self.start_ringing(ctx)
    }

    fn force_commit(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        if !self.committed {
            self.answer(ctx);
        }
        Ok(())
    }

    fn is_committed(&self) -> bool {
        self.committed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cl_core::{CharacterProfile, Vec2};

    use super::*;
    use crate::error::{ConfigError, DialogueError};
    use crate::event::EventKind;
    use crate::trigger::testing::Harness;

    fn profiles() -> Vec<CharacterProfile> {
        vec![
            CharacterProfile::new("Caller")
                .with_sentence("It's me.")
                .with_surface("caller.text")
                .with_animator("caller.box"),
            CharacterProfile::new("Apollo")
                .with_sentence("Busy.")
                .with_surface("apollo.text")
                .with_animator("apollo.box"),
        ]
    }

    fn phone() -> PhoneTrigger {
        PhoneTrigger::new("booth", "Caller", Volume::new(Vec2::new(0.0, 0.0), 3.0))
            .with_ring(Cue::new("phone", "ring"), &TriggerTimings::default())
            .with_enter_cue(Cue::new("sfx", "beep"))
    }

    #[test]
    fn rings_on_entry_and_keeps_ringing_out_of_range() {
        let mut h = Harness::new(profiles());
        let mut t = phone();
        h.step(&mut t, false);
        assert!(!t.is_ringing());

        h.player = Vec2::new(1.0, 1.0);
        h.step(&mut t, false);
        assert!(t.is_ringing());

        h.player = Vec2::new(50.0, 50.0);
        h.run(&mut t, Duration::from_millis(1500));
        assert!(t.is_ringing());
        assert_eq!(t.ring().map(RingLoop::rings), Some(2));
    }

    #[test]
    fn answering_stops_ring_for_good() {
        let mut h = Harness::new(profiles());
        let mut t = phone();
        h.player = Vec2::new(0.0, 0.0);
        h.step(&mut t, false);
        h.player = Vec2::new(50.0, 50.0);
        let unused = h.step(&mut t, true);
        assert!(!unused);
        assert!(t.is_committed());
        assert!(!t.is_ringing());
        assert!(h.stage.now_playing("phone").is_none());
        assert_eq!(h.stage.play_count("beep"), 1);
        assert_eq!(h.engine.active_character(), Some("Caller"));

        let rings = h.stage.play_count("ring");
        h.player = Vec2::new(0.0, 0.0);
        h.run(&mut t, Duration::from_secs(5));
        assert_eq!(h.stage.play_count("ring"), rings);
    }

    #[test]
    fn denied_answer_keeps_ringing() {
        let mut h = Harness::new(profiles());
        let mut t = phone();
        h.with(false, Duration::ZERO, |ctx| {
            ctx.conversations
                .start_conversation(&mut ctx.fx, "Apollo", EntryMode::Direct)
                .unwrap();
        });
        h.player = Vec2::new(0.0, 0.0);
        h.step(&mut t, false);
        h.step(&mut t, true);
        assert!(!t.is_committed());
        assert!(t.is_ringing());
        assert_eq!(
            h.events
                .count(|k| matches!(k, EventKind::TriggerDenied { .. })),
            1
        );
    }

    #[test]
    fn force_ring_without_tone_connects() {
        let mut h = Harness::new(profiles());
        let mut t = PhoneTrigger::new("intercom", "Caller", Volume::new(Vec2::new(0.0, 0.0), 1.0));
        h.with(false, Duration::ZERO, |ctx| t.force_ring(ctx).unwrap());
        assert!(t.is_committed());
        assert_eq!(h.engine.active_character(), Some("Caller"));
    }

    #[test]
    fn unknown_ring_length_does_not_ring() {
        let mut h = Harness::new(profiles());
        let mut t = PhoneTrigger::new("booth", "Caller", Volume::new(Vec2::new(0.0, 0.0), 3.0))
            .with_ring(Cue::new("phone", "mystery"), &TriggerTimings::default());
        h.with(false, Duration::ZERO, |ctx| {
            let err = t.force_ring(ctx).unwrap_err();
            assert!(matches!(
                err,
                DialogueError::Configuration(ConfigError::UnknownClipLength { .. })
            ));
        });
        assert!(!t.is_ringing());
    }
}
