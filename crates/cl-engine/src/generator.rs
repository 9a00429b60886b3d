//! The power generator puzzle.
//!
//! Powering the generator lights it up, powers a linked door and, after a
//! delay, rings a phone whose call connects to a character. The powered
//! flag is persisted under `power_generator.<name>` but cleared on every
//! initialisation, so each run starts unpowered.

use std::any::Any;
use std::time::Duration;

use cl_core::{Cue, DoorId, EffectId, SpriteId, Tint, Volume};

use crate::config::TriggerTimings;
use crate::context::TickContext;
use crate::conversation::EntryMode;
use crate::error::DialogueResult;
use crate::event::EventKind;
use crate::timer::Timer;
use crate::trigger::{Proximity, RingLoop, Trigger, commit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unpowered,
    AwaitingRing(Timer),
    Ringing,
    Answering(Timer),
    Connected(Timer),
    Done,
}

/// Generator that powers a door, then rings with a call.
#[derive(Debug, Clone)]
pub struct PowerGenerator {
    name: String,
    character: String,
    proximity: Proximity,
    ring: RingLoop,
    ring_delay: Duration,
    answer_delay: Duration,
    forced_advance_delay: Duration,
    effect: Option<EffectId>,
    indicator: Option<SpriteId>,
    activation_cues: Vec<Cue>,
    answer_cue: Option<Cue>,
    door: Option<DoorId>,
    phase: Phase,
    committed: bool,
}

impl PowerGenerator {
    /// A generator over `volume` that rings with `ring` once powered.
    pub fn new(
        name: impl Into<String>,
        character: impl Into<String>,
        volume: Volume,
        ring: Cue,
        timings: &TriggerTimings,
    ) -> Self {
        Self {
            name: name.into(),
            character: character.into(),
            proximity: Proximity::new(volume, true),
            ring: RingLoop::new(ring, timings.ring_interval),
            ring_delay: timings.generator_ring_delay,
            answer_delay: timings.answer_delay,
            forced_advance_delay: timings.forced_advance_delay,
            effect: None,
            indicator: None,
            activation_cues: Vec::new(),
            answer_cue: None,
            door: None,
            phase: Phase::Unpowered,
            committed: false,
        }
    }

    /// Delay between powering up and the first ring.
    pub fn with_ring_delay(mut self, delay: Duration) -> Self {
        self.ring_delay = delay;
        self
    }

    /// Silence between rings.
    pub fn with_ring_interval(mut self, interval: Duration) -> Self {
        self.ring = RingLoop::new(self.ring.cue().clone(), interval);
        self
    }

    /// Particle effect switched on when powered.
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(EffectId::new(effect));
        self
    }

    /// Indicator sprite tinted green when powered.
    pub fn with_indicator(mut self, sprite: impl Into<String>) -> Self {
        self.indicator = Some(SpriteId::new(sprite));
        self
    }

    /// Add a sound played on power-up.
    pub fn with_activation_cue(mut self, cue: Cue) -> Self {
        self.activation_cues.push(cue);
        self
    }

    /// Sound played when the call connects.
    pub fn with_answer_cue(mut self, cue: Cue) -> Self {
        self.answer_cue = Some(cue);
        self
    }

    /// Door enabled on power-up.
    pub fn with_door(mut self, door: impl Into<String>) -> Self {
        self.door = Some(DoorId::new(door));
        self
    }

    /// Preference key holding the powered flag.
    pub fn pref_key(&self) -> String {
        format!("power_generator.{}", self.name)
    }

    /// Whether the generator has been powered.
    pub fn is_powered(&self) -> bool {
        self.phase != Phase::Unpowered
    }

    /// Whether the phone is ringing.
    pub fn is_ringing(&self) -> bool {
        self.ring.is_ringing()
    }

    /// The ring loop.
    pub fn ring(&self) -> &RingLoop {
        &self.ring
    }

    fn power_up(&mut self, ctx: &mut TickContext<'_>) {
        ctx.prefs.set_flag(&self.pref_key(), true);
        match &self.effect {
            Some(effect) => ctx.fx.stage.set_effect(effect, true),
            None => tracing::error!(trigger = %self.name, "no effect to start"),
        }
        match &self.indicator {
            Some(sprite) => ctx.fx.stage.set_tint(sprite, Tint::Green),
            None => tracing::error!(trigger = %self.name, "no indicator to tint"),
        }
        for cue in &self.activation_cues {
            ctx.fx.stage.play_once(&cue.channel, &cue.clip);
        }
        tracing::info!(trigger = %self.name, "generator powered");
        ctx.fx.emit(
            EventKind::GeneratorPowered {
                trigger: self.name.clone(),
            },
            format!("{}: powered", self.name),
        );
        if let Some(door) = &self.door {
            ctx.fx.stage.enable_door(door);
            ctx.fx.emit(
                EventKind::DoorEnabled {
                    trigger: self.name.clone(),
                    door: door.clone(),
                },
                format!("{}: door {door} enabled", self.name),
            );
        }
        tracing::debug!(trigger = %self.name, delay = ?self.ring_delay, "ring scheduled");
        self.phase = Phase::AwaitingRing(Timer::new(self.ring_delay));
    }

    fn begin_ringing(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        match self.ring.start(&mut ctx.fx, &self.name) {
            Ok(()) => {
                self.phase = Phase::Ringing;
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Done;
                Err(err)
            }
        }
    }

    /// Commit the call. A denied commit puts the generator back in `fallback`.
    fn connect(&mut self, ctx: &mut TickContext<'_>, fallback: Phase) {
        if commit(ctx, &self.name, &self.character, EntryMode::Direct).is_none() {
            self.phase = fallback;
            return;
        }
        self.ring.cancel(&mut ctx.fx, &self.name);
        if let Some(cue) = &self.answer_cue {
            ctx.fx.stage.play_once(&cue.channel, &cue.clip);
        }
        self.committed = true;
        self.phase = Phase::Connected(Timer::new(self.forced_advance_delay));
    }

    fn nudge_conversation(&mut self, ctx: &mut TickContext<'_>) {
        self.phase = Phase::Done;
        if ctx.conversations.active_character() != Some(self.character.as_str()) {
            tracing::debug!(trigger = %self.name, "call no longer active; not advancing");
            return;
        }
        if let Err(err) = ctx.conversations.force_advance(&mut ctx.fx) {
            tracing::warn!(trigger = %self.name, "forced advance failed: {err}");
        }
    }
}

impl Trigger for PowerGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn character(&self) -> &str {
        &self.character
    }

    fn init(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        let key = self.pref_key();
        ctx.prefs.remove(&key);
        let powered = ctx.prefs.get_flag(&key).unwrap_or(false);

        match &self.effect {
            Some(effect) => ctx.fx.stage.set_effect(effect, powered),
            None => tracing::warn!(trigger = %self.name, "no effect assigned"),
        }
        match &self.indicator {
            Some(sprite) => {
                let tint = if powered { Tint::Green } else { Tint::Clear };
                ctx.fx.stage.set_tint(sprite, tint);
            }
            None => tracing::warn!(trigger = %self.name, "no indicator assigned"),
        }
        if self.door.is_none() {
            tracing::warn!(trigger = %self.name, "no door assigned");
        }
        self.ring.cancel(&mut ctx.fx, &self.name);
        tracing::debug!(trigger = %self.name, powered, "generator initialised");
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        self.proximity.update(ctx.player);
        match self.phase {
            Phase::Unpowered => {
                if self.proximity.eligible() && ctx.consume_advance() {
                    self.power_up(ctx);
                }
            }
            Phase::AwaitingRing(mut timer) => {
                if timer.tick(ctx.dt) {
                    self.begin_ringing(ctx)?;
                } else {
                    self.phase = Phase::AwaitingRing(timer);
                }
            }
            Phase::Ringing => {
                self.ring.tick(&mut ctx.fx, &self.name, ctx.dt);
                if ctx.consume_advance() {
                    tracing::info!(trigger = %self.name, "answering");
                    self.phase = Phase::Answering(Timer::new(self.answer_delay));
                }
            }
            Phase::Answering(mut timer) => {
                self.ring.tick(&mut ctx.fx, &self.name, ctx.dt);
                if timer.tick(ctx.dt) {
                    self.connect(ctx, Phase::Ringing);
                } else {
                    self.phase = Phase::Answering(timer);
                }
            }
            Phase::Connected(mut timer) => {
                if timer.tick(ctx.dt) {
                    self.nudge_conversation(ctx);
                } else {
                    self.phase = Phase::Connected(timer);
                }
            }
            Phase::Done => {}
        }
        Ok(())
    }

    fn force_ring(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        match self.phase {
            Phase::AwaitingRing(_) => self.begin_ringing(ctx),
            Phase::Unpowered => {
                tracing::debug!(trigger = %self.name, "not powered; ring ignored");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn force_commit(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        match self.phase {
            Phase::AwaitingRing(_) => {
                self.connect(ctx, self.phase);
                Ok(())
            }
            Phase::Ringing | Phase::Answering(_) => {
                self.connect(ctx, Phase::Ringing);
                Ok(())
            }
            Phase::Unpowered => {
                tracing::debug!(trigger = %self.name, "not powered; commit ignored");
                Ok(())
            }
            Phase::Connected(_) | Phase::Done => Ok(()),
        }
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
    use cl_core::{CharacterProfile, Preferences, Vec2};

    use super::*;
    use crate::conversation::ConversationState;
    use crate::trigger::testing::Harness;

    fn profiles() -> Vec<CharacterProfile> {
        vec![
            CharacterProfile::new("Operator")
                .with_sentences(["Power's back.", "Head for the door."])
                .with_surface("op.text")
                .with_animator("op.box"),
            CharacterProfile::new("Apollo")
                .with_sentence("Busy.")
                .with_surface("apollo.text")
                .with_animator("apollo.box"),
        ]
    }

    fn generator() -> PowerGenerator {
        PowerGenerator::new(
            "gen-a",
            "Operator",
            Volume::new(Vec2::new(0.0, 0.0), 2.0),
            Cue::new("phone", "ring"),
            &TriggerTimings::default(),
        )
        .with_ring_delay(Duration::from_secs(1))
        .with_effect("gen-a.sparks")
        .with_indicator("gen-a.light")
        .with_activation_cue(Cue::new("gen1", "beep"))
        .with_answer_cue(Cue::new("sfx", "beep"))
        .with_door("door-7")
    }

    #[test]
    fn init_clears_persisted_power() {
        let mut h = Harness::new(profiles());
        h.prefs.set_flag("power_generator.gen-a", true);
        let mut g = generator();
        h.init(&mut g);
        assert_eq!(h.prefs.get_flag("power_generator.gen-a"), None);
        assert!(!g.is_powered());
        assert!(!h.stage.effect_on("gen-a.sparks"));
        assert_eq!(h.stage.tint("gen-a.light"), Some(Tint::Clear));
    }

    #[test]
    fn full_puzzle_flow() {
        let mut h = Harness::new(profiles());
        let mut g = generator();
        h.init(&mut g);

        h.player = Vec2::new(1.0, 0.0);
        h.step(&mut g, true);
        assert!(g.is_powered());
        assert_eq!(h.prefs.get_flag("power_generator.gen-a"), Some(true));
        assert!(h.stage.effect_on("gen-a.sparks"));
        assert_eq!(h.stage.tint("gen-a.light"), Some(Tint::Green));
        assert!(h.stage.door_enabled("door-7"));
        assert!(!g.is_ringing());

        h.run(&mut g, Duration::from_millis(1050));
        assert!(g.is_ringing());

        h.player = Vec2::new(40.0, 0.0);
        h.step(&mut g, true);
        h.run(&mut g, Duration::from_millis(150));
        assert!(g.is_committed());
        assert!(!g.is_ringing());
        assert_eq!(h.engine.active_character(), Some("Operator"));
        assert_eq!(h.engine.state(), ConversationState::Opening);

        h.run(&mut g, Duration::from_millis(850));
        assert_eq!(h.engine.state(), ConversationState::Typing);
        assert_eq!(h.stage.text("op.text"), "Power's back.");
    }

    #[test]
    fn busy_line_returns_to_ringing() {
        let mut h = Harness::new(profiles());
        let mut g = generator();
        h.init(&mut g);
        h.player = Vec2::new(0.0, 0.0);
        h.step(&mut g, true);
        h.with(false, Duration::ZERO, |ctx| {
            g.force_ring(ctx).unwrap();
            ctx.conversations
                .start_conversation(&mut ctx.fx, "Apollo", EntryMode::Direct)
                .unwrap();
        });
        assert!(g.is_ringing());
        h.step(&mut g, true);
        h.run(&mut g, Duration::from_millis(150));
        assert!(!g.is_committed());
        assert!(g.is_ringing());
    }

    #[test]
    fn denied_commit_keeps_ring_delay() {
        let mut h = Harness::new(profiles());
        let mut g = generator();
        h.init(&mut g);
        h.player = Vec2::new(0.0, 0.0);
        h.step(&mut g, true);
        h.with(false, Duration::ZERO, |ctx| {
            ctx.conversations
                .start_conversation(&mut ctx.fx, "Apollo", EntryMode::Direct)
                .unwrap();
            g.force_commit(ctx).unwrap();
        });
        assert!(!g.is_committed());

        h.step(&mut g, false);
        assert!(!g.is_ringing(), "ring delay must still be running");
        h.run(&mut g, Duration::from_millis(1000));
        assert!(g.is_ringing());
    }

    #[test]
    fn force_ring_requires_power() {
        let mut h = Harness::new(profiles());
        let mut g = generator();
        h.init(&mut g);
        h.with(false, Duration::ZERO, |ctx| g.force_ring(ctx).unwrap());
        assert!(!g.is_ringing());
    }

    #[test]
    fn no_nudge_when_call_was_ended() {
        let mut h = Harness::new(profiles());
        let mut g = generator();
        h.init(&mut g);
        h.player = Vec2::new(0.0, 0.0);
        h.step(&mut g, true);
        h.with(false, Duration::ZERO, |ctx| g.force_commit(ctx).unwrap());
        assert!(g.is_committed());
        h.with(false, Duration::ZERO, |ctx| {
            ctx.conversations.end_conversation(&mut ctx.fx).unwrap();
        });
        h.run(&mut g, Duration::from_secs(1));
        assert!(!h.engine.is_active());
        assert_eq!(
            h.events
                .count(|k| matches!(k, EventKind::ForcedAdvance { .. })),
            0
        );
    }
}
