//! Tick-driven dialogue engine for Comlink.
//!
//! A [`Director`] owns one [`ConversationEngine`] and any number of entry
//! triggers. Each call to [`Director::tick`] advances the clock by one
//! fixed step, lets the engine type text, and lets every trigger react to
//! the player's position and the advance key. Every timed behaviour is an
//! explicit piece of state (a [`Timer`], a [`TypingRender`], a ring loop)
//! that is cancelled explicitly before anything replaces it.

/// Fixed-step clock.
pub mod clock;
/// Engine, dialogue and trigger timing configuration.
pub mod config;
/// Context handed to triggers each tick.
pub mod context;
/// The conversation state machine.
pub mod conversation;
/// The per-tick scheduler owning engine and triggers.
pub mod director;
/// Error types for the engine.
pub mod error;
/// Engine events and the event log.
pub mod event;
/// The power generator puzzle trigger.
pub mod generator;
/// Per-tick player input.
pub mod input;
/// Building a director from a scene file.
pub mod scene;
/// Fire-once countdown timers.
pub mod timer;
/// Entry triggers: face-to-face, access terminal, phone.
pub mod trigger;
/// Chunked typing animation.
pub mod typing;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-exports of the configuration types.
pub use config::{DialogueConfig, EngineConfig, TriggerTimings};
/// Re-exports of the context types.
pub use context::{Effects, TickContext};
/// Re-exports of the conversation types.
pub use conversation::{
    AdvanceOutcome, ConversationEngine, ConversationSession, ConversationState, EntryMode,
    SessionId,
};
/// Re-export of [`director::Director`].
pub use director::Director;
/// Re-exports of the error types.
pub use error::{ConfigError, DialogueError, DialogueResult};
/// Re-exports of the event types.
pub use event::{EngineEvent, EventKind, EventLog};
/// Re-export of [`generator::PowerGenerator`].
pub use generator::PowerGenerator;
/// Re-export of [`input::InputFrame`].
pub use input::InputFrame;
/// Re-export of [`timer::Timer`].
pub use timer::Timer;
/// Re-exports of the trigger types.
pub use trigger::{ComputerTrigger, DirectTrigger, PhoneTrigger, RingLoop, Trigger};
/// Re-export of [`typing::TypingRender`].
pub use typing::TypingRender;
