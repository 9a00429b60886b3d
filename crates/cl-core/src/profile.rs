use serde::{Deserialize, Serialize};

use crate::handle::{AnimatorId, ClipId, Cue, SurfaceId};

/// A speaking character: identity, lines, and the handles the engine
/// drives while the character talks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Unique name, used as the lookup key.
    pub name: String,
    /// Lines spoken in order.
    #[serde(default)]
    pub dialogue: Vec<String>,
    /// Voice clips aligned with `dialogue` by index. Gaps and a shorter
    /// list are allowed; those sentences are simply not voiced.
    #[serde(default)]
    pub voice_clips: Vec<Option<ClipId>>,
    /// Surface showing the typed text.
    #[serde(default)]
    pub surface: Option<SurfaceId>,
    /// Animator that opens and closes the dialogue box.
    #[serde(default)]
    pub animator: Option<AnimatorId>,
    /// Sound played when the conversation ends.
    #[serde(default)]
    pub exit_cue: Option<Cue>,
}

impl CharacterProfile {
    /// Create a profile with no lines and no handles.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialogue: Vec::new(),
            voice_clips: Vec::new(),
            surface: None,
            animator: None,
            exit_cue: None,
        }
    }

    /// Append a line.
    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.dialogue.push(sentence.into());
        self
    }

    /// Replace all lines.
    pub fn with_sentences<I, S>(mut self, sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dialogue = sentences.into_iter().map(Into::into).collect();
        self
    }

    /// Append a voice clip slot; `None` leaves that sentence silent.
    pub fn with_voice_clip(mut self, clip: Option<&str>) -> Self {
        self.voice_clips.push(clip.map(ClipId::new));
        self
    }

    /// Set the text surface.
    pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
        self.surface = Some(SurfaceId::new(surface));
        self
    }

    /// Set the animator.
    pub fn with_animator(mut self, animator: impl Into<String>) -> Self {
        self.animator = Some(AnimatorId::new(animator));
        self
    }

    /// Set the exit sound.
    pub fn with_exit_cue(mut self, cue: Cue) -> Self {
        self.exit_cue = Some(cue);
        self
    }

    /// Voice clip for the sentence at `index`, if one is assigned.
    pub fn voice_clip(&self, index: usize) -> Option<&ClipId> {
        self.voice_clips.get(index).and_then(Option::as_ref)
    }

    /// `(clips, sentences)` when voice clips are assigned but their count
    /// differs from the sentence count.
    pub fn voice_mismatch(&self) -> Option<(usize, usize)> {
        let clips = self.voice_clips.len();
        let sentences = self.dialogue.len();
        (clips > 0 && clips != sentences).then_some((clips, sentences))
    }
}
