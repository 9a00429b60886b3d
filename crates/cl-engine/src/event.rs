use cl_core::{ClipId, DoorId};

use crate::conversation::{ConversationState, EntryMode};

/// What kind of engine event occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    // Conversations
    /// A conversation started.
    ConversationStarted {
        /// Character talking.
        character: String,
        /// Entry mode.
        mode: EntryMode,
    },
    /// A start request was refused.
    StartRejected {
        /// Character requested.
        character: String,
        /// Why it was refused.
        reason: String,
    },
    /// The conversation changed state.
    StateChanged {
        /// Character talking.
        character: String,
        /// Previous state.
        from: ConversationState,
        /// New state.
        to: ConversationState,
    },
    /// A sentence began typing.
    SentenceStarted {
        /// Character talking.
        character: String,
        /// Zero-based sentence index.
        index: usize,
    },
    /// A sentence was skipped to its full text.
    SentenceSkipped {
        /// Character talking.
        character: String,
        /// Zero-based sentence index.
        index: usize,
    },
    /// A sentence finished typing on its own.
    SentenceCompleted {
        /// Character talking.
        character: String,
        /// Zero-based sentence index.
        index: usize,
    },
    /// A voice clip started for a sentence.
    VoicePlayed {
        /// Character talking.
        character: String,
        /// Zero-based sentence index.
        index: usize,
        /// Clip played.
        clip: ClipId,
    },
    /// The voice clip count differs from the sentence count.
    VoiceMismatch {
        /// Character talking.
        character: String,
        /// Number of voice clips.
        clips: usize,
        /// Number of sentences.
        sentences: usize,
    },
    /// The conversation was advanced without player input.
    ForcedAdvance {
        /// Character talking.
        character: String,
    },
    /// The conversation ended.
    ConversationEnded {
        /// Character that was talking.
        character: String,
    },

    // Triggers
    /// A terminal showed its prompt.
    PromptShown {
        /// Trigger name.
        trigger: String,
    },
    /// A terminal began its access-granted flash.
    FlashStarted {
        /// Trigger name.
        trigger: String,
    },
    /// A phone began ringing.
    RingStarted {
        /// Trigger name.
        trigger: String,
    },
    /// One ring sounded.
    Ring {
        /// Trigger name.
        trigger: String,
        /// Rings so far, starting at 1.
        count: u32,
    },
    /// A phone stopped ringing.
    RingCancelled {
        /// Trigger name.
        trigger: String,
    },
    /// A trigger handed control to the conversation engine.
    TriggerCommitted {
        /// Trigger name.
        trigger: String,
        /// Character started.
        character: String,
    },
    /// A trigger's commit was refused; its flags are unchanged.
    TriggerDenied {
        /// Trigger name.
        trigger: String,
        /// Character requested.
        character: String,
        /// Why it was refused.
        reason: String,
    },
    /// A trigger aborted its interaction on a configuration problem.
    TriggerFailed {
        /// Trigger name.
        trigger: String,
        /// What went wrong.
        reason: String,
    },

    // Puzzle
    /// A generator was powered.
    GeneratorPowered {
        /// Trigger name.
        trigger: String,
    },
    /// A door was powered.
    DoorEnabled {
        /// Trigger that powered it.
        trigger: String,
        /// Door handle.
        door: DoorId,
    },
}

impl EventKind {
    /// The character or trigger this event is about.
    pub fn subject(&self) -> &str {
        match self {
            Self::ConversationStarted { character, .. }
            | Self::StartRejected { character, .. }
            | Self::StateChanged { character, .. }
            | Self::SentenceStarted { character, .. }
            | Self::SentenceSkipped { character, .. }
            | Self::SentenceCompleted { character, .. }
            | Self::VoicePlayed { character, .. }
            | Self::VoiceMismatch { character, .. }
            | Self::ForcedAdvance { character }
            | Self::ConversationEnded { character } => character,
            Self::PromptShown { trigger }
            | Self::FlashStarted { trigger }
            | Self::RingStarted { trigger }
            | Self::Ring { trigger, .. }
            | Self::RingCancelled { trigger }
            | Self::TriggerCommitted { trigger, .. }
            | Self::TriggerDenied { trigger, .. }
            | Self::TriggerFailed { trigger, .. }
            | Self::GeneratorPowered { trigger }
            | Self::DoorEnabled { trigger, .. } => trigger,
        }
    }

    /// Whether this event reports a refused or degraded operation.
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::StartRejected { .. }
                | Self::TriggerDenied { .. }
                | Self::TriggerFailed { .. }
                | Self::VoiceMismatch { .. }
        )
    }
}

/// A record of something that happened during play.
#[derive(Debug, Clone)]
pub struct EngineEvent {
    /// Tick at which the event occurred.
    pub tick: u64,
    /// What happened.
    pub kind: EventKind,
    /// Human-readable description.
    pub description: String,
}

impl EngineEvent {
    /// Create an event.
    pub fn new(tick: u64, kind: EventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during play.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a log with the given capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events beyond capacity.
    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// All recorded events.
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Events recorded at `tick`.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&EngineEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Events about a character or trigger.
    pub fn events_for(&self, subject: &str) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.kind.subject() == subject)
            .collect()
    }

    /// Number of events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&EventKind) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(&e.kind)).count()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
