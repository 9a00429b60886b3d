use std::time::Duration;

use cl_core::{Preferences, Stage, Vec2};

use crate::conversation::ConversationEngine;
use crate::event::{EngineEvent, EventKind, EventLog};

/// Where engine and triggers send their observable effects: the stage
/// for presentation and audio, the event log for the record.
pub struct Effects<'a> {
    /// Presentation, audio and door collaborator.
    pub stage: &'a mut dyn Stage,
    /// Event log.
    pub events: &'a mut EventLog,
    /// Current tick, stamped on emitted events.
    pub tick: u64,
}

impl Effects<'_> {
    /// Record an event at the current tick.
    pub fn emit(&mut self, kind: EventKind, description: impl Into<String>) {
        self.events
            .push(EngineEvent::new(self.tick, kind, description));
    }
}

/// Mutable context lent to each trigger during a tick.
///
/// The conversation engine is borrowed, never owned: triggers request
/// transitions through its operations and never see session fields.
pub struct TickContext<'a> {
    /// Output side.
    pub fx: Effects<'a>,
    /// The one conversation engine.
    pub conversations: &'a mut ConversationEngine,
    /// Persistent flags.
    pub prefs: &'a mut dyn Preferences,
    /// Time covered by this tick (zero for out-of-band calls).
    pub dt: Duration,
    /// Player position this tick.
    pub player: Vec2,
    advance: bool,
}

impl<'a> TickContext<'a> {
    /// Assemble a context. `advance` is the still-unconsumed key edge.
    pub fn new(
        fx: Effects<'a>,
        conversations: &'a mut ConversationEngine,
        prefs: &'a mut dyn Preferences,
        dt: Duration,
        player: Vec2,
        advance: bool,
    ) -> Self {
        Self {
            fx,
            conversations,
            prefs,
            dt,
            player,
            advance,
        }
    }

    /// Whether the advance key went down this tick and nobody used it yet.
    pub fn advance_pressed(&self) -> bool {
        self.advance
    }

    /// Take the advance key edge. Returns whether it was available.
    pub fn consume_advance(&mut self) -> bool {
        std::mem::take(&mut self.advance)
    }
}
