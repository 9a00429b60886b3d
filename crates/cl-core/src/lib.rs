//! Core types for Comlink: character profiles, the character registry,
//! and the collaborator surface the dialogue engine drives.
//!
//! Nothing in this crate is timed. The [`Stage`] and [`Preferences`]
//! traits describe what the engine needs from the game around it; the
//! in-memory implementations here back the CLI and the test suites.

/// Error types used throughout the crate.
pub mod error;
/// Typed handles naming surfaces, animators, audio channels, clips and doors.
pub mod handle;
/// Persistent preference storage.
pub mod prefs;
/// Character profiles: who speaks, what they say, where it is shown.
pub mod profile;
/// Name-keyed registry of character profiles.
pub mod registry;
/// Scene files describing characters, clips and triggers.
pub mod scene;
/// Points and trigger volumes.
pub mod space;
/// The presentation/audio/door collaborator trait and a recording implementation.
pub mod stage;

/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export handle types.
pub use handle::{AnimatorId, ChannelId, ClipId, Cue, DoorId, EffectId, SpriteId, SurfaceId};
/// Re-export preference types.
pub use prefs::{MemoryPreferences, Preferences};
/// Re-export profile types.
pub use profile::CharacterProfile;
/// Re-export the registry.
pub use registry::CharacterRegistry;
/// Re-export scene file types.
pub use scene::{SceneFile, SceneIssue, SceneSettings, Severity, TriggerSpec};
/// Re-export spatial types.
pub use space::{Vec2, Volume};
/// Re-export stage types.
pub use stage::{RecordingStage, Stage, StageCall, Tint};
