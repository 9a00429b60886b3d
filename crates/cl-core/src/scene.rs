//! Scene files: a JSON description of the characters, clip lengths,
//! triggers and engine settings for one playable area.
//!
//! Durations are written in seconds. Every field except character and
//! trigger names has a default, so a minimal scene is short:
//!
//! ```json
//! {
//!   "characters": [{ "name": "Apollo", "dialogue": ["Hello."],
//!                    "surface": "apollo_text", "animator": "apollo_box" }],
//!   "triggers": [{ "kind": "direct", "name": "desk", "character": "Apollo",
//!                  "volume": { "center": { "x": 0, "y": 0 }, "radius": 2 } }]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::handle::{ChannelId, ClipId, Cue, DoorId, EffectId, SpriteId, SurfaceId};
use crate::profile::CharacterProfile;
use crate::space::{Vec2, Volume};

/// A complete scene description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Human-readable scene name.
    pub name: String,
    /// Engine setting overrides.
    pub settings: SceneSettings,
    /// Where the player starts.
    pub player_start: Vec2,
    /// Clip lengths in seconds.
    pub clips: BTreeMap<ClipId, f64>,
    /// Speaking characters.
    pub characters: Vec<CharacterProfile>,
    /// Entry triggers and puzzle objects.
    pub triggers: Vec<TriggerSpec>,
}

/// Optional overrides for engine settings; `None` keeps the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Seconds per scheduler tick.
    pub tick_seconds: Option<f64>,
    /// Typing speed in characters per second.
    pub typing_speed: Option<f64>,
    /// Characters revealed per typing step.
    pub chunk_size: Option<usize>,
    /// Wait after the dialogue box opens, before the mode delay.
    pub settle_delay: Option<f64>,
    /// Extra wait before typing in computer mode.
    pub computer_delay: Option<f64>,
    /// Extra wait before typing in phone / face-to-face mode.
    pub phone_delay: Option<f64>,
    /// Channel voice clips play on.
    pub voice_channel: Option<ChannelId>,
    /// Maximum event log size (0 = unlimited).
    pub max_events: Option<usize>,
}

fn default_true() -> bool {
    true
}

/// One trigger in a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerSpec {
    /// Face-to-face: press advance in range to talk.
    Direct {
        /// Unique trigger name.
        name: String,
        /// Character spoken to.
        character: String,
        /// Trigger volume.
        volume: Volume,
        /// When false the trigger works from anywhere.
        #[serde(default = "default_true")]
        require_range: bool,
        /// Sound played when the player presses advance.
        #[serde(default)]
        enter_cue: Option<Cue>,
    },
    /// Access terminal: prompt, flash, then a computer-mode conversation.
    Computer {
        /// Unique trigger name.
        name: String,
        /// Character spoken to.
        character: String,
        /// Trigger volume.
        volume: Volume,
        /// When false the trigger works from anywhere.
        #[serde(default = "default_true")]
        require_range: bool,
        /// Surface showing the prompt and confirmation.
        message_surface: SurfaceId,
        /// Prompt text; defaults to "ID REQUIRED".
        #[serde(default)]
        prompt: Option<String>,
        /// Confirmation text; defaults to "ACCESS GRANTED".
        #[serde(default)]
        confirm: Option<String>,
        /// Sound played when the player presses advance.
        #[serde(default)]
        enter_cue: Option<Cue>,
    },
    /// A ringing phone answered with advance.
    Phone {
        /// Unique trigger name.
        name: String,
        /// Character calling.
        character: String,
        /// Trigger volume.
        volume: Volume,
        /// When false the trigger works from anywhere.
        #[serde(default = "default_true")]
        require_range: bool,
        /// Ring tone; without one, `force_ring` connects immediately.
        #[serde(default)]
        ring: Option<Cue>,
        /// Seconds of silence between rings.
        #[serde(default)]
        ring_interval: Option<f64>,
        /// Sound played when the call is answered.
        #[serde(default)]
        enter_cue: Option<Cue>,
    },
    /// Power generator: power it, then answer the call that follows.
    Generator {
        /// Unique trigger name.
        name: String,
        /// Character calling once powered.
        character: String,
        /// Trigger volume.
        volume: Volume,
        /// Ring tone.
        ring: Cue,
        /// Seconds of silence between rings.
        #[serde(default)]
        ring_interval: Option<f64>,
        /// Seconds between powering up and the first ring.
        #[serde(default)]
        ring_delay: Option<f64>,
        /// Effect switched on when powered.
        #[serde(default)]
        effect: Option<EffectId>,
        /// Indicator tinted green when powered.
        #[serde(default)]
        indicator: Option<SpriteId>,
        /// Sounds played on power-up.
        #[serde(default)]
        activation_cues: Vec<Cue>,
        /// Sound played when the call is answered.
        #[serde(default)]
        answer_cue: Option<Cue>,
        /// Door powered together with the generator.
        #[serde(default)]
        door: Option<DoorId>,
    },
}

impl TriggerSpec {
    /// The trigger's unique name.
    pub fn name(&self) -> &str {
        match self {
            Self::Direct { name, .. }
            | Self::Computer { name, .. }
            | Self::Phone { name, .. }
            | Self::Generator { name, .. } => name,
        }
    }

    /// The character this trigger starts a conversation with.
    pub fn character(&self) -> &str {
        match self {
            Self::Direct { character, .. }
            | Self::Computer { character, .. }
            | Self::Phone { character, .. }
            | Self::Generator { character, .. } => character,
        }
    }

    /// Short kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Computer { .. } => "computer",
            Self::Phone { .. } => "phone",
            Self::Generator { .. } => "generator",
        }
    }

    fn cues(&self) -> Vec<&Cue> {
        match self {
            Self::Direct { enter_cue, .. } | Self::Computer { enter_cue, .. } => {
                enter_cue.iter().collect()
            }
            Self::Phone {
                ring, enter_cue, ..
            } => ring.iter().chain(enter_cue.iter()).collect(),
            Self::Generator {
                ring,
                activation_cues,
                answer_cue,
                ..
            } => std::iter::once(ring)
                .chain(activation_cues.iter())
                .chain(answer_cue.iter())
                .collect(),
        }
    }
}

/// How bad a [`SceneIssue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Degrades gracefully at runtime.
    Warning,
    /// The affected interaction cannot run.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem found by [`SceneFile::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneIssue {
    /// How bad it is.
    pub severity: Severity,
    /// What it concerns (character or trigger name).
    pub subject: String,
    /// Description.
    pub message: String,
}

impl SceneIssue {
    fn error(subject: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            subject: subject.to_string(),
            message: message.into(),
        }
    }

    fn warning(subject: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            subject: subject.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SceneIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.subject, self.message)
    }
}

impl SceneFile {
    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scene file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let scene = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            characters = scene.characters.len(),
            triggers = scene.triggers.len(),
            "loaded scene"
        );
        Ok(scene)
    }

    /// Check the scene for configuration problems the engine would only
    /// report when the affected interaction is attempted.
    pub fn validate(&self) -> Vec<SceneIssue> {
        let mut issues = Vec::new();
        let mut names = HashSet::new();

        for profile in &self.characters {
            let name = profile.name.as_str();
            if !names.insert(name) {
                issues.push(SceneIssue::error(name, "duplicate character name"));
            }
            if profile.dialogue.is_empty() {
                issues.push(SceneIssue::error(name, "no sentences"));
            }
            if profile.surface.is_none() {
                issues.push(SceneIssue::error(name, "no text surface assigned"));
            }
            if profile.animator.is_none() {
                issues.push(SceneIssue::error(name, "no animator assigned"));
            }
            if let Some((clips, sentences)) = profile.voice_mismatch() {
                issues.push(SceneIssue::warning(
                    name,
                    format!("{clips} voice clips for {sentences} sentences"),
                ));
            }
            for clip in profile.voice_clips.iter().flatten() {
                if !self.clips.contains_key(clip) {
                    issues.push(SceneIssue::warning(
                        name,
                        format!("voice clip \"{clip}\" has no length"),
                    ));
                }
            }
        }

        if self.settings.typing_speed.is_some_and(|s| s <= 0.0) {
            issues.push(SceneIssue::warning(
                "settings",
                "typing speed is not positive; text appears one chunk per tick",
            ));
        }

        let mut trigger_names = HashSet::new();
        for trigger in &self.triggers {
            let name = trigger.name();
            if !trigger_names.insert(name) {
                issues.push(SceneIssue::error(name, "duplicate trigger name"));
            }
            if !names.contains(trigger.character()) {
                issues.push(SceneIssue::error(
                    name,
                    format!("unknown character \"{}\"", trigger.character()),
                ));
            }
            for cue in trigger.cues() {
                if !self.clips.contains_key(&cue.clip) {
                    issues.push(SceneIssue::warning(
                        name,
                        format!("clip \"{}\" has no length", cue.clip),
                    ));
                }
            }
        }

        issues
    }
}
