//! The per-tick scheduler.
//!
//! [`Director`] owns the clock, the stage, preferences, the event log,
//! the conversation engine and the registered triggers. Each tick runs
//! in a fixed order: clock, stage frame, engine timers, advance input,
//! then triggers in registration order. Exactly one party sees the
//! advance edge per tick.

use std::time::Duration;

use cl_core::{CharacterRegistry, MemoryPreferences, Preferences, Stage, Vec2};

use crate::clock::SimClock;
use crate::config::EngineConfig;
use crate::context::{Effects, TickContext};
use crate::conversation::{AdvanceOutcome, ConversationEngine, EntryMode, SessionId};
use crate::error::{DialogueError, DialogueResult};
use crate::event::{EventKind, EventLog};
use crate::input::InputFrame;
use crate::trigger::Trigger;

/// Owns the conversation engine and drives it together with the triggers.
pub struct Director<S: Stage> {
    clock: SimClock,
    stage: S,
    prefs: Box<dyn Preferences>,
    events: EventLog,
    conversations: ConversationEngine,
    triggers: Vec<Box<dyn Trigger>>,
    initialized: bool,
    player: Vec2,
}

impl<S: Stage> std::fmt::Debug for Director<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("tick", &self.clock.tick())
            .field("state", &self.conversations.state())
            .field("triggers", &self.triggers.len())
            .field("events", &self.events.len())
            .finish()
    }
}

fn effects<'a>(stage: &'a mut dyn Stage, events: &'a mut EventLog, tick: u64) -> Effects<'a> {
    Effects {
        stage,
        events,
        tick,
    }
}

impl<S: Stage> Director<S> {
    /// Create a director over `stage` with in-memory preferences.
    pub fn new(config: EngineConfig, registry: CharacterRegistry, stage: S) -> Self {
        Self {
            clock: SimClock::new(config.tick_length),
            stage,
            prefs: Box::new(MemoryPreferences::new()),
            events: EventLog::new(config.max_events),
            conversations: ConversationEngine::new(registry, config.dialogue),
            triggers: Vec::new(),
            initialized: false,
            player: Vec2::default(),
        }
    }

    /// Replace the preference store.
    pub fn with_preferences(mut self, prefs: impl Preferences + 'static) -> Self {
        self.prefs = Box::new(prefs);
        self
    }

    /// Register a trigger. Triggers tick in registration order; names
    /// must be unique.
    pub fn add_trigger<T: Trigger + 'static>(&mut self, trigger: T) -> DialogueResult<()> {
        self.add_boxed_trigger(Box::new(trigger))
    }

    /// Register an already boxed trigger.
    pub fn add_boxed_trigger(&mut self, trigger: Box<dyn Trigger>) -> DialogueResult<()> {
        if self.triggers.iter().any(|t| t.name() == trigger.name()) {
            return Err(DialogueError::DuplicateTrigger(trigger.name().to_string()));
        }
        tracing::debug!(
            trigger = trigger.name(),
            character = trigger.character(),
            "trigger registered"
        );
        self.triggers.push(trigger);
        Ok(())
    }

    /// Reset the stage for every character and trigger. Runs once; later
    /// calls do nothing. Every other operation calls it first.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        let tick = self.clock.tick();
        let mut fx = effects(&mut self.stage, &mut self.events, tick);
        self.conversations.init(&mut fx);
        for trigger in &mut self.triggers {
            let fx = effects(&mut self.stage, &mut self.events, tick);
            let mut ctx = TickContext::new(
                fx,
                &mut self.conversations,
                &mut *self.prefs,
                Duration::ZERO,
                self.player,
                false,
            );
            if let Err(err) = trigger.init(&mut ctx) {
                report(&mut ctx.fx, trigger.name(), &err);
            }
        }
        self.initialized = true;
        tracing::info!(
            characters = self.conversations.registry().len(),
            triggers = self.triggers.len(),
            "director initialised"
        );
    }

    /// Advance one fixed step.
    pub fn tick(&mut self, input: InputFrame) {
        self.init();
        let tick = self.clock.advance();
        let dt = self.clock.tick_length();
        self.player = input.player;
        self.stage.advance(dt);

        let active_at_start = self.conversations.is_active();
        let mut fx = effects(&mut self.stage, &mut self.events, tick);
        self.conversations.tick(&mut fx, dt);

        let mut advance = input.advance;
        if active_at_start && advance {
            advance = false;
            if let Err(err) = self.conversations.advance_or_skip(&mut fx) {
                tracing::warn!("advance failed: {err}");
            }
        }

        for trigger in &mut self.triggers {
            let fx = effects(&mut self.stage, &mut self.events, tick);
            let mut ctx = TickContext::new(
                fx,
                &mut self.conversations,
                &mut *self.prefs,
                dt,
                input.player,
                advance,
            );
            if let Err(err) = trigger.tick(&mut ctx) {
                report(&mut ctx.fx, trigger.name(), &err);
            }
            advance = ctx.advance_pressed();
        }
    }

    /// Run idle frames covering `span` at a fixed player position.
    /// Returns the number of ticks run.
    pub fn run_for(&mut self, span: Duration, player: Vec2) -> u64 {
        let ticks = self.clock.ticks_for(span);
        for _ in 0..ticks {
            self.tick(InputFrame::idle(player));
        }
        ticks
    }

    /// Start a conversation directly.
    pub fn start_conversation(
        &mut self,
        character: &str,
        mode: EntryMode,
    ) -> DialogueResult<SessionId> {
        self.init();
        let mut fx = effects(&mut self.stage, &mut self.events, self.clock.tick());
        self.conversations.start_conversation(&mut fx, character, mode)
    }

    /// Skip typing or show the next sentence.
    pub fn advance_or_skip(&mut self) -> DialogueResult<AdvanceOutcome> {
        self.init();
        let mut fx = effects(&mut self.stage, &mut self.events, self.clock.tick());
        self.conversations.advance_or_skip(&mut fx)
    }

    /// Advance without waiting for the first-sentence gate.
    pub fn force_advance(&mut self) -> DialogueResult<AdvanceOutcome> {
        self.init();
        let mut fx = effects(&mut self.stage, &mut self.events, self.clock.tick());
        self.conversations.force_advance(&mut fx)
    }

    /// End the active conversation.
    pub fn end_conversation(&mut self) -> DialogueResult<()> {
        self.init();
        let mut fx = effects(&mut self.stage, &mut self.events, self.clock.tick());
        self.conversations.end_conversation(&mut fx)
    }

    /// Make the named trigger ring now.
    pub fn force_ring(&mut self, trigger: &str) -> DialogueResult<()> {
        self.with_trigger(trigger, |t, ctx| t.force_ring(ctx))
    }

    /// Make the named trigger commit now.
    pub fn force_commit(&mut self, trigger: &str) -> DialogueResult<()> {
        self.with_trigger(trigger, |t, ctx| t.force_commit(ctx))
    }

    fn with_trigger<F>(&mut self, name: &str, f: F) -> DialogueResult<()>
    where
        F: FnOnce(&mut dyn Trigger, &mut TickContext<'_>) -> DialogueResult<()>,
    {
        self.init();
        let Some(trigger) = self.triggers.iter_mut().find(|t| t.name() == name) else {
            tracing::warn!(trigger = name, "no such trigger");
            return Err(DialogueError::UnknownTrigger(name.to_string()));
        };
        let fx = effects(&mut self.stage, &mut self.events, self.clock.tick());
        let mut ctx = TickContext::new(
            fx,
            &mut self.conversations,
            &mut *self.prefs,
            Duration::ZERO,
            self.player,
            false,
        );
        let result = f(trigger.as_mut(), &mut ctx);
        if let Err(err) = &result {
            report(&mut ctx.fx, name, err);
        }
        result
    }

    /// Access a trigger by name, downcast to its concrete type.
    pub fn trigger<T: Trigger + 'static>(&self, name: &str) -> Option<&T> {
        self.triggers
            .iter()
            .find(|t| t.name() == name)
            .and_then(|t| t.as_any().downcast_ref::<T>())
    }

    /// Names of the registered triggers, in tick order.
    pub fn trigger_names(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(|t| t.name())
    }

    /// Whether the named trigger has committed.
    pub fn is_committed(&self, trigger: &str) -> Option<bool> {
        self.triggers
            .iter()
            .find(|t| t.name() == trigger)
            .map(|t| t.is_committed())
    }

    /// The conversation engine.
    pub fn conversations(&self) -> &ConversationEngine {
        &self.conversations
    }

    /// The stage.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// The stage, mutably.
    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The preference store.
    pub fn preferences(&self) -> &dyn Preferences {
        &*self.prefs
    }

    /// Player position as of the last tick.
    pub fn player(&self) -> Vec2 {
        self.player
    }
}

fn report(fx: &mut Effects<'_>, trigger: &str, err: &DialogueError) {
    tracing::error!(trigger, "{err}");
    fx.emit(
        EventKind::TriggerFailed {
            trigger: trigger.to_string(),
            reason: err.to_string(),
        },
        format!("{trigger}: {err}"),
    );
}
