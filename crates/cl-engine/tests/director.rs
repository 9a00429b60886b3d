//! End-to-end scenarios driven through the director.

use std::time::Duration;

use cl_core::{CharacterProfile, CharacterRegistry, Cue, RecordingStage, Vec2, Volume};
use cl_engine::{
    AdvanceOutcome, ConversationState, DialogueConfig, Director, DirectTrigger, EngineConfig,
    EntryMode, EventKind, InputFrame, PhoneTrigger, TriggerTimings,
};

const ORIGIN: Vec2 = Vec2::new(0.0, 0.0);

fn apollo() -> CharacterProfile {
    CharacterProfile::new("Apollo")
        .with_sentences(["Hello.", "Status: nominal."])
        .with_surface("apollo.text")
        .with_animator("apollo.box")
}

fn caller() -> CharacterProfile {
    CharacterProfile::new("Caller")
        .with_sentence("You found the phone.")
        .with_surface("caller.text")
        .with_animator("caller.box")
}

fn director_with(config: EngineConfig) -> Director<RecordingStage> {
    let registry = CharacterRegistry::from_profiles([apollo(), caller()]).unwrap();
    let stage = RecordingStage::new().with_clip("ring", Duration::from_millis(400));
    Director::new(config, registry, stage)
}

fn director() -> Director<RecordingStage> {
    director_with(EngineConfig::default())
}

#[test]
fn apollo_transcript() {
    let mut d = director();
    d.init();
    d.start_conversation("Apollo", EntryMode::Direct).unwrap();

    d.tick(InputFrame::press(ORIGIN));
    assert_eq!(d.conversations().state(), ConversationState::Opening);
    d.run_for(Duration::from_millis(750), ORIGIN);
    assert_eq!(d.conversations().state(), ConversationState::Typing);

    d.tick(InputFrame::press(ORIGIN));
    assert_eq!(d.conversations().state(), ConversationState::WaitingForAdvance);
    d.tick(InputFrame::press(ORIGIN));
    assert_eq!(d.conversations().state(), ConversationState::Typing);
    d.run_for(Duration::from_secs(1), ORIGIN);
    assert_eq!(d.conversations().state(), ConversationState::WaitingForAdvance);

    d.tick(InputFrame::press(ORIGIN));
    assert_eq!(d.conversations().state(), ConversationState::WaitingForAdvance);
    d.end_conversation().unwrap();
    assert_eq!(d.conversations().state(), ConversationState::Idle);

    let transcript = d
        .stage()
        .text_history("apollo.text")
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{i}: {text:?}"))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(transcript, @r#"
    0: ""
    1: ""
    2: "Hello."
    3: "Hello."
    4: "Status: nominal"
    5: "Status: nominal."
    6: ""
    "#);
}

#[test]
fn unknown_character_is_a_recorded_configuration_error() {
    let mut d = director();
    let err = d
        .start_conversation("Unknown", EntryMode::Direct)
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(d.conversations().state(), ConversationState::Idle);
    let problems: Vec<_> = d
        .events()
        .events()
        .iter()
        .filter(|e| e.kind.is_problem())
        .collect();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].kind.subject(), "Unknown");
}

#[test]
fn queue_exhaustion_types_every_sentence_once() {
    for n in 1..=5 {
        let sentences: Vec<String> = (0..n).map(|i| format!("Line {i}.")).collect();
        let registry = CharacterRegistry::from_profiles([CharacterProfile::new("Nyx")
            .with_sentences(sentences.clone())
            .with_surface("nyx.text")
            .with_animator("nyx.box")])
        .unwrap();
        let mut d = Director::new(EngineConfig::default(), registry, RecordingStage::new());
        d.start_conversation("Nyx", EntryMode::Direct).unwrap();

        let mut outcomes = Vec::new();
        for _ in 0..=n {
            outcomes.push(d.advance_or_skip().unwrap());
            d.run_for(Duration::from_secs(2), ORIGIN);
        }
        assert_eq!(outcomes[0], AdvanceOutcome::GateOpened);
        assert!(
            outcomes[1..n]
                .iter()
                .all(|o| *o == AdvanceOutcome::NextSentence)
        );
        assert_eq!(outcomes[n], AdvanceOutcome::QueueEmpty);
        assert_eq!(
            d.events()
                .count(|k| matches!(k, EventKind::SentenceStarted { .. })),
            n
        );
        assert_eq!(d.stage().text("nyx.text"), sentences[n - 1]);
    }
}

#[test]
fn mode_delays_are_independent() {
    let dialogue = DialogueConfig::default()
        .with_computer_delay(Duration::from_secs(2))
        .with_phone_delay(Duration::from_millis(100));
    let mut d = director_with(EngineConfig::default().with_dialogue(dialogue));

    d.start_conversation("Apollo", EntryMode::Computer).unwrap();
    d.run_for(Duration::from_millis(2400), ORIGIN);
    assert_eq!(d.conversations().state(), ConversationState::Opening);
    d.run_for(Duration::from_millis(200), ORIGIN);
    assert_eq!(d.conversations().state(), ConversationState::Typing);
    d.end_conversation().unwrap();

    d.start_conversation("Apollo", EntryMode::Direct).unwrap();
    d.advance_or_skip().unwrap();
    d.run_for(Duration::from_millis(550), ORIGIN);
    assert_eq!(d.conversations().state(), ConversationState::Opening);
    d.run_for(Duration::from_millis(100), ORIGIN);
    assert_eq!(d.conversations().state(), ConversationState::Typing);
}

#[test]
fn active_conversation_owns_the_advance_key() {
    let mut d = director();
    let phone = PhoneTrigger::new("booth", "Caller", Volume::new(ORIGIN, 2.0))
        .with_ring(Cue::new("phone", "ring"), &TriggerTimings::default());
    d.add_trigger(phone).unwrap();
    d.start_conversation("Apollo", EntryMode::Direct).unwrap();

    d.tick(InputFrame::idle(ORIGIN));
    let booth = d.trigger::<PhoneTrigger>("booth").unwrap();
    assert!(booth.is_ringing());

    // The press goes to Apollo's gate, not to the phone.
    d.tick(InputFrame::press(ORIGIN));
    assert_eq!(d.is_committed("booth"), Some(false));
    assert_eq!(d.conversations().active_character(), Some("Apollo"));

    d.end_conversation().unwrap();
    d.tick(InputFrame::press(Vec2::new(30.0, 0.0)));
    assert_eq!(d.is_committed("booth"), Some(true));
    assert_eq!(d.conversations().active_character(), Some("Caller"));
}

#[test]
fn committed_phone_never_rings_again() {
    let mut d = director();
    let phone = PhoneTrigger::new("booth", "Caller", Volume::new(ORIGIN, 2.0))
        .with_ring(Cue::new("phone", "ring"), &TriggerTimings::default());
    d.add_trigger(phone).unwrap();

    d.tick(InputFrame::idle(ORIGIN));
    d.tick(InputFrame::press(ORIGIN));
    assert_eq!(d.is_committed("booth"), Some(true));
    let rings = d.stage().play_count("ring");
    d.end_conversation().unwrap();

    let far = Vec2::new(30.0, 0.0);
    for _ in 0..3 {
        d.run_for(Duration::from_millis(500), far);
        d.run_for(Duration::from_millis(500), ORIGIN);
    }
    assert_eq!(d.stage().play_count("ring"), rings);
    assert!(d.stage().now_playing("phone").is_none());
}

#[test]
fn two_triggers_one_press() {
    let mut d = director();
    let timings = TriggerTimings::default();
    d.add_trigger(DirectTrigger::new("a", "Apollo", Volume::new(ORIGIN, 2.0), &timings))
        .unwrap();
    d.add_trigger(DirectTrigger::new("b", "Caller", Volume::new(ORIGIN, 2.0), &timings))
        .unwrap();

    d.tick(InputFrame::press(ORIGIN));
    d.run_for(Duration::from_millis(200), ORIGIN);
    assert_eq!(d.is_committed("a"), Some(true));
    assert_eq!(d.is_committed("b"), Some(false));
    assert_eq!(d.conversations().active_character(), Some("Apollo"));
}

#[test]
fn force_calls_need_a_known_trigger() {
    let mut d = director();
    assert!(d.force_ring("nowhere").is_err());
    assert!(d.force_commit("nowhere").is_err());
}

#[test]
fn duplicate_trigger_is_rejected() {
    let mut d = director();
    let timings = TriggerTimings::default();
    d.add_trigger(DirectTrigger::new("a", "Apollo", Volume::new(ORIGIN, 2.0), &timings))
        .unwrap();
    assert!(
        d.add_trigger(DirectTrigger::new("a", "Caller", Volume::new(ORIGIN, 2.0), &timings))
            .is_err()
    );
}
