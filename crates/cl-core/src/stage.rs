use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::handle::{AnimatorId, ChannelId, ClipId, DoorId, EffectId, SpriteId, SurfaceId};

/// Indicator tints used by puzzle objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tint {
    /// Fully transparent (indicator off).
    Clear,
    /// Green (powered).
    Green,
}

/// Everything the dialogue engine asks of the game around it: text
/// surfaces, dialogue-box animators, audio, doors and visual effects.
///
/// All calls are fire-and-forget. Handles the implementation does not
/// know are ignored by the implementation, never reported back.
pub trait Stage: std::fmt::Debug {
    /// Replace a surface's text.
    fn set_text(&mut self, surface: &SurfaceId, text: &str);

    /// Show or hide a surface.
    fn set_visible(&mut self, surface: &SurfaceId, visible: bool);

    /// Open or close a dialogue box.
    fn set_open(&mut self, animator: &AnimatorId, open: bool);

    /// Activate or deactivate a dialogue box's presentation entirely.
    fn set_active(&mut self, animator: &AnimatorId, active: bool);

    /// Play a clip once on a channel, replacing whatever it was playing.
    fn play_once(&mut self, channel: &ChannelId, clip: &ClipId);

    /// Stop a channel.
    fn stop(&mut self, channel: &ChannelId);

    /// Whether a channel is currently sounding.
    fn is_playing(&self, channel: &ChannelId) -> bool;

    /// Length of a clip, `None` when the clip is unknown.
    fn clip_length(&self, clip: &ClipId) -> Option<Duration>;

    /// Power a door so it can be opened.
    fn enable_door(&mut self, door: &DoorId);

    /// Switch a visual effect on or off.
    fn set_effect(&mut self, effect: &EffectId, on: bool);

    /// Tint a sprite.
    fn set_tint(&mut self, sprite: &SpriteId, tint: Tint);

    /// Advance presentation time by one scheduler tick.
    fn advance(&mut self, _dt: Duration) {}
}

/// One call made against a [`RecordingStage`].
#[derive(Debug, Clone, PartialEq)]
pub enum StageCall {
    /// `set_text`.
    SetText {
        /// Target surface.
        surface: SurfaceId,
        /// New text.
        text: String,
    },
    /// `set_visible`.
    SetVisible {
        /// Target surface.
        surface: SurfaceId,
        /// New visibility.
        visible: bool,
    },
    /// `set_open`.
    SetOpen {
        /// Target animator.
        animator: AnimatorId,
        /// Open or closed.
        open: bool,
    },
    /// `set_active`.
    SetActive {
        /// Target animator.
        animator: AnimatorId,
        /// Active or not.
        active: bool,
    },
    /// `play_once`.
    Play {
        /// Channel used.
        channel: ChannelId,
        /// Clip played.
        clip: ClipId,
    },
    /// `stop`.
    Stop {
        /// Channel stopped.
        channel: ChannelId,
    },
    /// `enable_door`.
    EnableDoor {
        /// Door powered.
        door: DoorId,
    },
    /// `set_effect`.
    SetEffect {
        /// Effect switched.
        effect: EffectId,
        /// On or off.
        on: bool,
    },
    /// `set_tint`.
    SetTint {
        /// Sprite tinted.
        sprite: SpriteId,
        /// New tint.
        tint: Tint,
    },
}

#[derive(Debug, Clone)]
struct Playback {
    clip: ClipId,
    remaining: Option<Duration>,
}

/// An in-memory [`Stage`] that records every call and keeps the
/// resulting state queryable. Clips play for their registered length;
/// clips without a length play until stopped.
#[derive(Debug, Default)]
pub struct RecordingStage {
    calls: Vec<StageCall>,
    clip_lengths: HashMap<ClipId, Duration>,
    texts: HashMap<SurfaceId, String>,
    visible: HashMap<SurfaceId, bool>,
    open: HashMap<AnimatorId, bool>,
    active: HashMap<AnimatorId, bool>,
    playing: HashMap<ChannelId, Playback>,
    doors: HashSet<DoorId>,
    effects: HashMap<EffectId, bool>,
    tints: HashMap<SpriteId, Tint>,
}

impl RecordingStage {
    /// Create a stage with no known clips.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip length.
    pub fn with_clip(mut self, clip: impl Into<String>, length: Duration) -> Self {
        self.clip_lengths.insert(ClipId::new(clip), length);
        self
    }

    /// Register many clip lengths at once.
    pub fn with_clips<I>(mut self, clips: I) -> Self
    where
        I: IntoIterator<Item = (ClipId, Duration)>,
    {
        self.clip_lengths.extend(clips);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[StageCall] {
        &self.calls
    }

    /// Current text of a surface (empty when never set).
    pub fn text(&self, surface: &str) -> &str {
        self.texts
            .get(&SurfaceId::new(surface))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Every text a surface has shown, in order.
    pub fn text_history(&self, surface: &str) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StageCall::SetText { surface: s, text } if s.as_str() == surface => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Whether a surface is visible (surfaces start visible).
    pub fn is_visible(&self, surface: &str) -> bool {
        self.visible
            .get(&SurfaceId::new(surface))
            .copied()
            .unwrap_or(true)
    }

    /// Whether an animator is open.
    pub fn is_open(&self, animator: &str) -> bool {
        self.open
            .get(&AnimatorId::new(animator))
            .copied()
            .unwrap_or(false)
    }

    /// Whether an animator is active.
    pub fn is_active(&self, animator: &str) -> bool {
        self.active
            .get(&AnimatorId::new(animator))
            .copied()
            .unwrap_or(false)
    }

    /// The clip currently playing on a channel.
    pub fn now_playing(&self, channel: &str) -> Option<&ClipId> {
        self.playing.get(&ChannelId::new(channel)).map(|p| &p.clip)
    }

    /// How many times a clip has been started.
    pub fn play_count(&self, clip: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StageCall::Play { clip: played, .. } if played.as_str() == clip))
            .count()
    }

    /// Whether a door has been powered.
    pub fn door_enabled(&self, door: &str) -> bool {
        self.doors.contains(&DoorId::new(door))
    }

    /// Whether an effect is on.
    pub fn effect_on(&self, effect: &str) -> bool {
        self.effects
            .get(&EffectId::new(effect))
            .copied()
            .unwrap_or(false)
    }

    /// Current tint of a sprite.
    pub fn tint(&self, sprite: &str) -> Option<Tint> {
        self.tints.get(&SpriteId::new(sprite)).copied()
    }
}

impl Stage for RecordingStage {
    fn set_text(&mut self, surface: &SurfaceId, text: &str) {
        self.texts.insert(surface.clone(), text.to_string());
        self.calls.push(StageCall::SetText {
            surface: surface.clone(),
            text: text.to_string(),
        });
    }

    fn set_visible(&mut self, surface: &SurfaceId, visible: bool) {
        self.visible.insert(surface.clone(), visible);
        self.calls.push(StageCall::SetVisible {
            surface: surface.clone(),
            visible,
        });
    }

    fn set_open(&mut self, animator: &AnimatorId, open: bool) {
        self.open.insert(animator.clone(), open);
        self.calls.push(StageCall::SetOpen {
            animator: animator.clone(),
            open,
        });
    }

    fn set_active(&mut self, animator: &AnimatorId, active: bool) {
        self.active.insert(animator.clone(), active);
        self.calls.push(StageCall::SetActive {
            animator: animator.clone(),
            active,
        });
    }

    fn play_once(&mut self, channel: &ChannelId, clip: &ClipId) {
        let remaining = self.clip_lengths.get(clip).copied();
        self.playing.insert(
            channel.clone(),
            Playback {
                clip: clip.clone(),
                remaining,
            },
        );
        self.calls.push(StageCall::Play {
            channel: channel.clone(),
            clip: clip.clone(),
        });
    }

    fn stop(&mut self, channel: &ChannelId) {
        self.playing.remove(channel);
        self.calls.push(StageCall::Stop {
            channel: channel.clone(),
        });
    }

    fn is_playing(&self, channel: &ChannelId) -> bool {
        self.playing.contains_key(channel)
    }

    fn clip_length(&self, clip: &ClipId) -> Option<Duration> {
        self.clip_lengths.get(clip).copied()
    }

    fn enable_door(&mut self, door: &DoorId) {
        self.doors.insert(door.clone());
        self.calls.push(StageCall::EnableDoor { door: door.clone() });
    }

    fn set_effect(&mut self, effect: &EffectId, on: bool) {
        self.effects.insert(effect.clone(), on);
        self.calls.push(StageCall::SetEffect {
            effect: effect.clone(),
            on,
        });
    }

    fn set_tint(&mut self, sprite: &SpriteId, tint: Tint) {
        self.tints.insert(sprite.clone(), tint);
        self.calls.push(StageCall::SetTint {
            sprite: sprite.clone(),
            tint,
        });
    }

    fn advance(&mut self, dt: Duration) {
        self.playing.retain(|_, playback| match playback.remaining.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(dt);
                !remaining.is_zero()
            }
            None => true,
        });
    }
}
