//! Error types for the dialogue engine.

use thiserror::Error;

/// Result type for engine operations.
pub type DialogueResult<T> = Result<T, DialogueError>;

/// A missing or invalid piece of configuration. The affected interaction
/// is aborted and nothing is left half-started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No profile with this name is registered.
    #[error("no character named \"{0}\"")]
    UnknownCharacter(String),

    /// The profile has no sentences.
    #[error("character \"{0}\" has no sentences")]
    EmptyDialogue(String),

    /// The profile has no animator handle.
    #[error("character \"{0}\" has no animator assigned")]
    MissingAnimator(String),

    /// The profile has no text surface handle.
    #[error("character \"{0}\" has no text surface assigned")]
    MissingSurface(String),

    /// A ring clip's length is unknown, so the ring cannot be paced.
    #[error("clip \"{clip}\" used by \"{trigger}\" has no known length")]
    UnknownClipLength {
        /// Trigger owning the ring.
        trigger: String,
        /// The clip.
        clip: String,
    },
}

/// Errors that can occur while driving conversations.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Configuration problem.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A conversation is already running.
    #[error("cannot start \"{requested}\": conversation with \"{active}\" is active")]
    ConcurrencyConflict {
        /// Character currently talking.
        active: String,
        /// Character that was requested.
        requested: String,
    },

    /// An operation needed a conversation but none is running.
    #[error("no active conversation")]
    NoActiveConversation,

    /// No trigger with this name is registered.
    #[error("no trigger named \"{0}\"")]
    UnknownTrigger(String),

    /// A trigger with this name is already registered.
    #[error("trigger already exists: \"{0}\"")]
    DuplicateTrigger(String),

    /// Core model error (duplicate character, unreadable scene).
    #[error(transparent)]
    Core(#[from] cl_core::CoreError),
}

impl DialogueError {
    /// Whether the error is a configuration problem rather than a timing one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Core(_))
    }
}
