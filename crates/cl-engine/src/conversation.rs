//! The conversation state machine.
//!
//! One [`ConversationEngine`] exists per game. It owns the character
//! registry and at most one [`ConversationSession`]. States:
//!
//! ```text
//! Idle → Opening → Typing ⇄ WaitingForAdvance → Closing → Idle
//! ```
//!
//! Computer-mode sessions start typing on their own once the open delay
//! elapses. Direct-mode sessions stay gated in `Opening` until the first
//! advance arms that delay.

use std::collections::VecDeque;
use std::fmt;

use cl_core::{CharacterProfile, CharacterRegistry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DialogueConfig;
use crate::context::Effects;
use crate::error::{ConfigError, DialogueError, DialogueResult};
use crate::event::EventKind;
use crate::timer::Timer;
use crate::typing::{TypingRender, TypingStep};

/// How a conversation was entered. Only changes the pre-typing delay and
/// whether the first sentence waits for an advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Access terminal: types automatically after the computer delay.
    Computer,
    /// Phone call or face-to-face: waits for the first advance.
    Direct,
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computer => write!(f, "computer"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Where the conversation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationState {
    /// No conversation.
    Idle,
    /// Box open, first sentence not yet typing.
    Opening,
    /// A sentence is being revealed.
    Typing,
    /// The current sentence is fully shown.
    WaitingForAdvance,
    /// Tearing down.
    Closing,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Opening => write!(f, "opening"),
            Self::Typing => write!(f, "typing"),
            Self::WaitingForAdvance => write!(f, "waiting"),
            Self::Closing => write!(f, "closing"),
        }
    }
}

/// Unique identifier of one conversation, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// What an advance request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The direct-mode gate opened; typing starts after the open delay.
    GateOpened,
    /// Typing was cut short and the full sentence shown.
    Skipped,
    /// The next sentence started typing.
    NextSentence,
    /// All sentences are shown; the conversation waits to be ended.
    QueueEmpty,
    /// Nothing to do (no conversation, or the open delay is pending).
    Ignored,
}

/// The single conversation in progress.
#[derive(Debug)]
pub struct ConversationSession {
    id: SessionId,
    character: String,
    mode: EntryMode,
    state: ConversationState,
    queue: VecDeque<String>,
    sentence_index: usize,
    waiting_for_first_sentence: bool,
    open_timer: Option<Timer>,
    typing: Option<TypingRender>,
}

impl ConversationSession {
    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Character talking.
    pub fn character(&self) -> &str {
        &self.character
    }

    /// Entry mode.
    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// Current state.
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Sentences not yet started.
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Number of sentences not yet started.
    pub fn remaining_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of sentences started so far (index of the next voice clip).
    pub fn sentence_index(&self) -> usize {
        self.sentence_index
    }

    /// Whether a sentence is being revealed.
    pub fn is_typing(&self) -> bool {
        self.state == ConversationState::Typing
    }

    /// Whether a direct-mode session still waits for its first advance.
    pub fn is_waiting_for_first_sentence(&self) -> bool {
        self.waiting_for_first_sentence
    }

    /// Whether the open delay is counting down.
    pub fn is_open_pending(&self) -> bool {
        self.open_timer.is_some()
    }

    /// The in-flight render, if typing.
    pub fn typing(&self) -> Option<&TypingRender> {
        self.typing.as_ref()
    }

    fn set_state(&mut self, fx: &mut Effects<'_>, to: ConversationState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(character = %self.character, session = %self.id, %from, %to, "state change");
        fx.emit(
            EventKind::StateChanged {
                character: self.character.clone(),
                from,
                to,
            },
            format!("{}: {from} -> {to}", self.character),
        );
    }
}

/// The conversation state machine.
#[derive(Debug)]
pub struct ConversationEngine {
    registry: CharacterRegistry,
    config: DialogueConfig,
    session: Option<ConversationSession>,
}

impl ConversationEngine {
    /// Create an idle engine over a registry.
    pub fn new(registry: CharacterRegistry, config: DialogueConfig) -> Self {
        Self {
            registry,
            config,
            session: None,
        }
    }

    /// The character registry.
    pub fn registry(&self) -> &CharacterRegistry {
        &self.registry
    }

    /// The dialogue configuration.
    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    /// Current state (`Idle` without a session).
    pub fn state(&self) -> ConversationState {
        self.session
            .as_ref()
            .map_or(ConversationState::Idle, |s| s.state)
    }

    /// Whether a conversation is running.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a sentence is being revealed.
    pub fn is_typing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_typing())
    }

    /// Name of the character talking.
    pub fn active_character(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.character.as_str())
    }

    /// Reset every character's presentation and report missing handles.
    pub fn init(&mut self, fx: &mut Effects<'_>) {
        for profile in self.registry.iter() {
            match &profile.surface {
                Some(surface) => fx.stage.set_text(surface, ""),
                None => tracing::warn!(character = %profile.name, "no text surface assigned"),
            }
            match &profile.animator {
                Some(animator) => fx.stage.set_active(animator, false),
                None => tracing::warn!(character = %profile.name, "no animator assigned"),
            }
            if profile.dialogue.is_empty() {
                tracing::warn!(character = %profile.name, "no sentences");
            }
            if let Some(cue) = &profile.exit_cue {
                if fx.stage.is_playing(&cue.channel) {
                    fx.stage.stop(&cue.channel);
                }
            }
        }
        match &self.config.voice_channel {
            Some(channel) => {
                if fx.stage.is_playing(channel) {
                    fx.stage.stop(channel);
                }
            }
            None => tracing::warn!("no voice channel assigned; voice clips will not play"),
        }
    }

    /// Start a conversation with `character`.
    ///
    /// Refused while another conversation is active, or when the
    /// character is unknown, has no sentences, or lacks a surface or
    /// animator. A refusal changes nothing.
    pub fn start_conversation(
        &mut self,
        fx: &mut Effects<'_>,
        character: &str,
        mode: EntryMode,
    ) -> DialogueResult<SessionId> {
        if let Some(active) = &self.session {
            let err = DialogueError::ConcurrencyConflict {
                active: active.character.clone(),
                requested: character.to_string(),
            };
            tracing::warn!(character, active = %active.character, "{err}");
            reject(fx, character, &err);
            return Err(err);
        }

        let profile = match validate_profile(&self.registry, character) {
            Ok(profile) => profile,
            Err(config) => {
                let err = DialogueError::Configuration(config);
                tracing::error!(character, "{err}");
                reject(fx, character, &err);
                return Err(err);
            }
        };

        if let Some((clips, sentences)) = profile.voice_mismatch() {
            tracing::warn!(
                character,
                clips,
                sentences,
                "voice clip count does not match sentence count"
            );
            fx.emit(
                EventKind::VoiceMismatch {
                    character: character.to_string(),
                    clips,
                    sentences,
                },
                format!("{character}: {clips} voice clips for {sentences} sentences"),
            );
        }

        for other in self.registry.iter().filter(|p| p.name != character) {
            if let Some(animator) = &other.animator {
                fx.stage.set_active(animator, false);
            }
        }
        if let Some(animator) = &profile.animator {
            fx.stage.set_active(animator, true);
            fx.stage.set_open(animator, true);
        }
        if let Some(surface) = &profile.surface {
            fx.stage.set_text(surface, "");
        }

        let mut session = ConversationSession {
            id: SessionId::new(),
            character: profile.name.clone(),
            mode,
            state: ConversationState::Idle,
            queue: profile.dialogue.iter().cloned().collect(),
            sentence_index: 0,
            waiting_for_first_sentence: mode == EntryMode::Direct,
            open_timer: None,
            typing: None,
        };
        if mode == EntryMode::Computer {
            session.open_timer = Some(Timer::new(self.config.open_delay(mode)));
        }
        session.set_state(fx, ConversationState::Opening);

        let id = session.id;
        tracing::info!(
            character,
            session = %id,
            %mode,
            sentences = session.queue.len(),
            "conversation started"
        );
        fx.emit(
            EventKind::ConversationStarted {
                character: character.to_string(),
                mode,
            },
            format!("{character}: conversation started ({mode})"),
        );
        self.session = Some(session);
        Ok(id)
    }

    /// Skip the sentence being typed, or type the next one.
    ///
    /// In a gated direct-mode session the first call opens the gate. Once
    /// the queue is empty this does nothing; the conversation stays open
    /// until [`end_conversation`](Self::end_conversation).
    pub fn advance_or_skip(&mut self, fx: &mut Effects<'_>) -> DialogueResult<AdvanceOutcome> {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("advance with no active conversation");
            return Ok(AdvanceOutcome::Ignored);
        };
        let outcome = match session.state {
            ConversationState::Opening if session.waiting_for_first_sentence => {
                session.waiting_for_first_sentence = false;
                session.open_timer = Some(Timer::new(self.config.open_delay(session.mode)));
                tracing::debug!(character = %session.character, "first advance; typing after open delay");
                AdvanceOutcome::GateOpened
            }
            ConversationState::Typing => {
                self.skip(fx);
                AdvanceOutcome::Skipped
            }
            ConversationState::WaitingForAdvance if session.queue.is_empty() => {
                tracing::info!(
                    character = %session.character,
                    "all sentences displayed; waiting for end"
                );
                AdvanceOutcome::QueueEmpty
            }
            ConversationState::WaitingForAdvance => {
                self.type_next(fx);
                AdvanceOutcome::NextSentence
            }
            ConversationState::Opening | ConversationState::Idle | ConversationState::Closing => {
                AdvanceOutcome::Ignored
            }
        };
        Ok(outcome)
    }

    /// Advance without waiting for the first-sentence gate or the open
    /// delay. Outside `Opening` this is [`advance_or_skip`](Self::advance_or_skip).
    pub fn force_advance(&mut self, fx: &mut Effects<'_>) -> DialogueResult<AdvanceOutcome> {
        let Some(session) = self.session.as_mut() else {
            tracing::warn!("forced advance with no active conversation");
            return Err(DialogueError::NoActiveConversation);
        };
        tracing::info!(character = %session.character, state = %session.state, "forced advance");
        fx.emit(
            EventKind::ForcedAdvance {
                character: session.character.clone(),
            },
            format!("{}: forced advance", session.character),
        );
        if session.state != ConversationState::Opening {
            return self.advance_or_skip(fx);
        }
        session.waiting_for_first_sentence = false;
        session.open_timer = None;
        self.type_next(fx);
        Ok(AdvanceOutcome::NextSentence)
    }

    /// Tear down the conversation: cancel typing, silence the voice,
    /// clear the text, close the box and play the exit cue.
    pub fn end_conversation(&mut self, fx: &mut Effects<'_>) -> DialogueResult<()> {
        let Some(mut session) = self.session.take() else {
            tracing::warn!("end requested but no conversation is active");
            return Err(DialogueError::NoActiveConversation);
        };
        session.set_state(fx, ConversationState::Closing);
        session.typing = None;
        session.open_timer = None;
        let dropped = session.queue.len();
        session.queue.clear();
        self.silence_voice(fx);

        if let Some(profile) = self.registry.find(&session.character) {
            if let Some(surface) = &profile.surface {
                fx.stage.set_text(surface, "");
            }
            if let Some(animator) = &profile.animator {
                fx.stage.set_open(animator, false);
            }
            if let Some(cue) = &profile.exit_cue {
                fx.stage.play_once(&cue.channel, &cue.clip);
            }
        }

        session.set_state(fx, ConversationState::Idle);
        tracing::info!(
            character = %session.character,
            session = %session.id,
            dropped,
            "conversation ended"
        );
        fx.emit(
            EventKind::ConversationEnded {
                character: session.character.clone(),
            },
            format!("{}: conversation ended", session.character),
        );
        Ok(())
    }

    /// Advance the open delay and the typing render by `dt`.
    pub fn tick(&mut self, fx: &mut Effects<'_>, dt: std::time::Duration) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.state {
            ConversationState::Opening => {
                let fired = session.open_timer.as_mut().is_some_and(|t| t.tick(dt));
                if fired {
                    session.open_timer = None;
                    self.type_next(fx);
                }
            }
            ConversationState::Typing => {
                let Some(render) = session.typing.as_mut() else {
                    return;
                };
                match render.tick(dt) {
                    TypingStep::Waiting => {}
                    TypingStep::Revealed => {
                        let text = render.visible().to_string();
                        if let Some(surface) = self
                            .registry
                            .find(&session.character)
                            .and_then(|p| p.surface.as_ref())
                        {
                            fx.stage.set_text(surface, &text);
                        }
                    }
                    TypingStep::Finished => {
                        session.typing = None;
                        let index = session.sentence_index.saturating_sub(1);
                        fx.emit(
                            EventKind::SentenceCompleted {
                                character: session.character.clone(),
                                index,
                            },
                            format!("{}: sentence {index} complete", session.character),
                        );
                        session.set_state(fx, ConversationState::WaitingForAdvance);
                    }
                }
            }
            ConversationState::Idle
            | ConversationState::WaitingForAdvance
            | ConversationState::Closing => {}
        }
    }

    /// Dequeue the next sentence and start typing it.
    fn type_next(&mut self, fx: &mut Effects<'_>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(sentence) = session.queue.pop_front() else {
            return;
        };
        let profile = self.registry.find(&session.character);
        let index = session.sentence_index;

        if let (Some(channel), Some(clip)) = (
            self.config.voice_channel.as_ref(),
            profile.and_then(|p| p.voice_clip(index)),
        ) {
            fx.stage.play_once(channel, clip);
            tracing::debug!(character = %session.character, index, %clip, "voice clip");
            fx.emit(
                EventKind::VoicePlayed {
                    character: session.character.clone(),
                    index,
                    clip: clip.clone(),
                },
                format!("{}: voice {clip}", session.character),
            );
        }
        session.sentence_index += 1;

        let render = TypingRender::start(
            sentence,
            self.config.effective_chunk(),
            self.config.chunk_interval(),
        );
        if let Some(surface) = profile.and_then(|p| p.surface.as_ref()) {
            fx.stage.set_text(surface, render.visible());
        }
        tracing::debug!(character = %session.character, index, sentence = render.sentence(), "typing");
        fx.emit(
            EventKind::SentenceStarted {
                character: session.character.clone(),
                index,
            },
            format!("{}: {}", session.character, render.sentence()),
        );
        session.typing = Some(render);
        session.set_state(fx, ConversationState::Typing);
    }

    /// Cut the current render short and show its full sentence.
    fn skip(&mut self, fx: &mut Effects<'_>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(render) = session.typing.take() else {
            return;
        };
        if let Some(surface) = self
            .registry
            .find(&session.character)
            .and_then(|p| p.surface.as_ref())
        {
            fx.stage.set_text(surface, render.sentence());
        }
        let index = session.sentence_index.saturating_sub(1);
        fx.emit(
            EventKind::SentenceSkipped {
                character: session.character.clone(),
                index,
            },
            format!("{}: sentence {index} skipped", session.character),
        );
        session.set_state(fx, ConversationState::WaitingForAdvance);
        self.silence_voice(fx);
    }

    fn silence_voice(&self, fx: &mut Effects<'_>) {
        if let Some(channel) = &self.config.voice_channel {
            if fx.stage.is_playing(channel) {
                fx.stage.stop(channel);
            }
        }
    }
}

/// Every check `start_conversation` needs, done before any mutation.
fn validate_profile<'r>(
    registry: &'r CharacterRegistry,
    character: &str,
) -> Result<&'r CharacterProfile, ConfigError> {
    let profile = registry
        .find(character)
        .ok_or_else(|| ConfigError::UnknownCharacter(character.to_string()))?;
    if profile.dialogue.is_empty() {
        return Err(ConfigError::EmptyDialogue(character.to_string()));
    }
    if profile.animator.is_none() {
        return Err(ConfigError::MissingAnimator(character.to_string()));
    }
    if profile.surface.is_none() {
        return Err(ConfigError::MissingSurface(character.to_string()));
    }
    Ok(profile)
}

fn reject(fx: &mut Effects<'_>, character: &str, err: &DialogueError) {
    fx.emit(
        EventKind::StartRejected {
            character: character.to_string(),
            reason: err.to_string(),
        },
        format!("{character}: start rejected: {err}"),
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cl_core::{CharacterProfile, Cue, RecordingStage, Stage};

    use super::*;
    use crate::event::EventLog;

    const STEP: Duration = Duration::from_millis(50);

    struct Rig {
        stage: RecordingStage,
        events: EventLog,
        engine: ConversationEngine,
    }

    impl Rig {
        fn new(profiles: Vec<CharacterProfile>) -> Self {
            let registry = CharacterRegistry::from_profiles(profiles).unwrap();
            let config = DialogueConfig::default().with_voice_channel("voice");
            Self {
                stage: RecordingStage::new().with_clip("hello-vo", Duration::from_secs(2)),
                events: EventLog::new(0),
                engine: ConversationEngine::new(registry, config),
            }
        }

        fn start(&mut self, name: &str, mode: EntryMode) -> DialogueResult<SessionId> {
            let mut fx = fx(&mut self.stage, &mut self.events);
            self.engine.start_conversation(&mut fx, name, mode)
        }

        fn advance(&mut self) -> AdvanceOutcome {
            let mut fx = fx(&mut self.stage, &mut self.events);
            self.engine.advance_or_skip(&mut fx).unwrap()
        }

        fn end(&mut self) -> DialogueResult<()> {
            let mut fx = fx(&mut self.stage, &mut self.events);
            self.engine.end_conversation(&mut fx)
        }

        fn run(&mut self, span: Duration) {
            let mut elapsed = Duration::ZERO;
            while elapsed < span {
                self.stage.advance(STEP);
                let mut fx = fx(&mut self.stage, &mut self.events);
                self.engine.tick(&mut fx, STEP);
                elapsed += STEP;
            }
        }
    }

    fn fx<'a>(stage: &'a mut RecordingStage, events: &'a mut EventLog) -> Effects<'a> {
        Effects {
            stage,
            events,
            tick: 0,
        }
    }

    fn apollo() -> CharacterProfile {
        CharacterProfile::new("Apollo")
            .with_sentences(["Hello.", "Status: nominal."])
            .with_surface("apollo.text")
            .with_animator("apollo.box")
            .with_exit_cue(Cue::new("sfx", "close"))
    }

    fn hermes() -> CharacterProfile {
        CharacterProfile::new("Hermes")
            .with_sentence("Thirty characters of message..")
            .with_voice_clip(Some("hello-vo"))
            .with_surface("hermes.text")
            .with_animator("hermes.box")
    }

    #[test]
    fn apollo_direct_walkthrough() {
        let mut rig = Rig::new(vec![apollo()]);
        rig.start("Apollo", EntryMode::Direct).unwrap();
        assert_eq!(rig.engine.state(), ConversationState::Opening);
        assert!(rig.stage.is_open("apollo.box"));

        // Gated: time alone does not start typing.
        rig.run(Duration::from_secs(2));
        assert_eq!(rig.engine.state(), ConversationState::Opening);

        assert_eq!(rig.advance(), AdvanceOutcome::GateOpened);
        rig.run(Duration::from_millis(750));
        assert_eq!(rig.engine.state(), ConversationState::Typing);
        assert_eq!(rig.stage.text("apollo.text"), "Hello.");

        assert_eq!(rig.advance(), AdvanceOutcome::Skipped);
        assert_eq!(rig.engine.state(), ConversationState::WaitingForAdvance);
        assert_eq!(rig.stage.text("apollo.text"), "Hello.");

        assert_eq!(rig.advance(), AdvanceOutcome::NextSentence);
        assert_eq!(rig.stage.text("apollo.text"), "Status: nominal");
        assert!(rig.engine.is_typing());
        rig.run(Duration::from_secs(1));
        assert_eq!(rig.stage.text("apollo.text"), "Status: nominal.");
        assert_eq!(rig.engine.state(), ConversationState::WaitingForAdvance);

        assert_eq!(rig.advance(), AdvanceOutcome::QueueEmpty);
        assert_eq!(rig.engine.state(), ConversationState::WaitingForAdvance);

        rig.end().unwrap();
        assert_eq!(rig.engine.state(), ConversationState::Idle);
        assert_eq!(rig.stage.text("apollo.text"), "");
        assert!(!rig.stage.is_open("apollo.box"));
        assert_eq!(rig.stage.play_count("close"), 1);
    }

    #[test]
    fn unknown_character_leaves_engine_idle() {
        let mut rig = Rig::new(vec![apollo()]);
        let err = rig.start("Unknown", EntryMode::Direct).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(rig.engine.state(), ConversationState::Idle);
        assert_eq!(
            rig.events
                .count(|k| matches!(k, EventKind::StartRejected { .. })),
            1
        );
        assert!(rig.stage.calls().is_empty());
    }

    #[test]
    fn computer_mode_types_without_input() {
        let mut rig = Rig::new(vec![apollo()]);
        rig.start("Apollo", EntryMode::Computer).unwrap();
        rig.run(Duration::from_millis(1400));
        assert_eq!(rig.engine.state(), ConversationState::Opening);
        rig.run(Duration::from_millis(200));
        assert_eq!(rig.engine.state(), ConversationState::Typing);
    }

    #[test]
    fn second_start_is_rejected_without_side_effects() {
        let mut rig = Rig::new(vec![apollo(), hermes()]);
        let first = rig.start("Apollo", EntryMode::Direct).unwrap();
        let calls_before = rig.stage.calls().len();
        let err = rig.start("Hermes", EntryMode::Direct).unwrap_err();
        assert!(matches!(err, DialogueError::ConcurrencyConflict { .. }));
        assert_eq!(rig.stage.calls().len(), calls_before);
        assert_eq!(rig.engine.session().map(|s| s.id()), Some(first));
        assert_eq!(rig.engine.active_character(), Some("Apollo"));
    }

    #[test]
    fn chunks_reveal_on_interval() {
        let mut rig = Rig::new(vec![hermes()]);
        rig.start("Hermes", EntryMode::Direct).unwrap();
        rig.advance();
        rig.run(Duration::from_millis(750));
        assert_eq!(rig.stage.text("hermes.text"), "Thirty characte");
        rig.run(Duration::from_millis(300));
        assert_eq!(
            rig.stage.text("hermes.text"),
            "Thirty characters of message.."
        );
    }

    #[test]
    fn voice_plays_and_skip_silences_it() {
        let mut rig = Rig::new(vec![hermes()]);
        rig.start("Hermes", EntryMode::Direct).unwrap();
        rig.advance();
        rig.run(Duration::from_millis(750));
        assert_eq!(
            rig.stage.now_playing("voice").map(|c| c.as_str()),
            Some("hello-vo")
        );
        rig.advance();
        assert!(rig.stage.now_playing("voice").is_none());
        assert_eq!(
            rig.engine.session().map(|s| s.sentence_index()),
            Some(1)
        );
    }

    #[test]
    fn mismatch_is_warned_not_fatal() {
        let profile = apollo().with_voice_clip(Some("hello-vo"));
        let mut rig = Rig::new(vec![profile]);
        rig.start("Apollo", EntryMode::Direct).unwrap();
        assert_eq!(
            rig.events
                .count(|k| matches!(k, EventKind::VoiceMismatch { clips: 1, sentences: 2, .. })),
            1
        );
    }

    #[test]
    fn empty_dialogue_and_missing_handles_are_config_errors() {
        let mut rig = Rig::new(vec![
            CharacterProfile::new("Mute")
                .with_surface("m.text")
                .with_animator("m.box"),
            CharacterProfile::new("Ghost").with_sentence("Boo."),
        ]);
        let mute = rig.start("Mute", EntryMode::Direct).unwrap_err();
        assert!(matches!(
            mute,
            DialogueError::Configuration(ConfigError::EmptyDialogue(_))
        ));
        let ghost = rig.start("Ghost", EntryMode::Direct).unwrap_err();
        assert!(matches!(
            ghost,
            DialogueError::Configuration(ConfigError::MissingAnimator(_))
        ));
        assert!(!rig.engine.is_active());
    }

    #[test]
    fn end_while_idle_is_an_error() {
        let mut rig = Rig::new(vec![apollo()]);
        assert!(matches!(
            rig.end(),
            Err(DialogueError::NoActiveConversation)
        ));
    }

    #[test]
    fn end_mid_typing_cancels_the_render() {
        let mut rig = Rig::new(vec![hermes()]);
        rig.start("Hermes", EntryMode::Direct).unwrap();
        rig.advance();
        rig.run(Duration::from_millis(750));
        assert!(rig.engine.is_typing());
        rig.end().unwrap();
        rig.run(Duration::from_secs(1));
        assert_eq!(rig.stage.text("hermes.text"), "");
        assert!(rig.stage.now_playing("voice").is_none());
    }

    #[test]
    fn force_advance_skips_the_gate_and_delay() {
        let mut rig = Rig::new(vec![apollo()]);
        rig.start("Apollo", EntryMode::Direct).unwrap();
        let mut fx = fx(&mut rig.stage, &mut rig.events);
        let outcome = rig.engine.force_advance(&mut fx).unwrap();
        assert_eq!(outcome, AdvanceOutcome::NextSentence);
        assert_eq!(rig.engine.state(), ConversationState::Typing);
        assert_eq!(rig.stage.text("apollo.text"), "Hello.");
    }

    #[test]
    fn restart_after_end_uses_fresh_queue() {
        let mut rig = Rig::new(vec![apollo()]);
        rig.start("Apollo", EntryMode::Direct).unwrap();
        rig.end().unwrap();
        rig.start("Apollo", EntryMode::Direct).unwrap();
        assert_eq!(rig.engine.session().map(|s| s.remaining_len()), Some(2));
    }
}
