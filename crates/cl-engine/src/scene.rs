//! Turning a [`SceneFile`] into a running [`Director`].

use std::time::Duration;

use cl_core::{CharacterRegistry, ClipId, SceneFile, SceneSettings, Stage, TriggerSpec};

use crate::config::{EngineConfig, TriggerTimings, seconds};
use crate::director::Director;
use crate::error::DialogueResult;
use crate::generator::PowerGenerator;
use crate::trigger::{ComputerTrigger, DirectTrigger, PhoneTrigger, Trigger};

/// Engine configuration with the scene's overrides applied.
pub fn engine_config(settings: &SceneSettings) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(tick) = settings.tick_seconds {
        let tick = seconds(tick);
        if !tick.is_zero() {
            config.tick_length = tick;
        }
    }
    if let Some(max) = settings.max_events {
        config.max_events = max;
    }

    let dialogue = &mut config.dialogue;
    if let Some(speed) = settings.typing_speed {
        dialogue.typing_speed = speed;
    }
    if let Some(chunk) = settings.chunk_size {
        dialogue.chunk_size = chunk;
    }
    if let Some(delay) = settings.settle_delay {
        dialogue.settle_delay = seconds(delay);
    }
    if let Some(delay) = settings.computer_delay {
        dialogue.computer_delay = seconds(delay);
    }
    if let Some(delay) = settings.phone_delay {
        dialogue.phone_delay = seconds(delay);
    }
    if let Some(channel) = &settings.voice_channel {
        dialogue.voice_channel = Some(channel.clone());
    }
    config
}

/// Clip lengths declared by the scene.
pub fn clip_lengths(scene: &SceneFile) -> impl Iterator<Item = (ClipId, Duration)> + '_ {
    scene
        .clips
        .iter()
        .map(|(clip, secs)| (clip.clone(), seconds(*secs)))
}

/// Build the runtime trigger for one scene trigger entry.
pub fn build_trigger(spec: &TriggerSpec, timings: &TriggerTimings) -> Box<dyn Trigger> {
    match spec {
        TriggerSpec::Direct {
            name,
            character,
            volume,
            require_range,
            enter_cue,
        } => {
            let mut trigger = DirectTrigger::new(name.as_str(), character.as_str(), *volume, timings)
                .with_require_range(*require_range);
            if let Some(cue) = enter_cue {
                trigger = trigger.with_enter_cue(cue.clone());
            }
            Box::new(trigger)
        }
        TriggerSpec::Computer {
            name,
            character,
            volume,
            require_range,
            message_surface,
            prompt,
            confirm,
            enter_cue,
        } => {
            let mut trigger = ComputerTrigger::new(
                name.as_str(),
                character.as_str(),
                *volume,
                message_surface.clone(),
                timings,
            )
            .with_require_range(*require_range);
            if let Some(prompt) = prompt {
                trigger = trigger.with_prompt(prompt.as_str());
            }
            if let Some(confirm) = confirm {
                trigger = trigger.with_confirm(confirm.as_str());
            }
            if let Some(cue) = enter_cue {
                trigger = trigger.with_enter_cue(cue.clone());
            }
            Box::new(trigger)
        }
        TriggerSpec::Phone {
            name,
            character,
            volume,
            require_range,
            ring,
            ring_interval,
            enter_cue,
        } => {
            let mut trigger = PhoneTrigger::new(name.as_str(), character.as_str(), *volume)
                .with_require_range(*require_range);
            if let Some(ring) = ring {
                let mut timings = timings.clone();
                if let Some(interval) = ring_interval {
                    timings = timings.with_ring_interval(seconds(*interval));
                }
                trigger = trigger.with_ring(ring.clone(), &timings);
            }
            if let Some(cue) = enter_cue {
                trigger = trigger.with_enter_cue(cue.clone());
            }
            Box::new(trigger)
        }
        TriggerSpec::Generator {
            name,
            character,
            volume,
            ring,
            ring_interval,
            ring_delay,
            effect,
            indicator,
            activation_cues,
            answer_cue,
            door,
        } => {
            let mut trigger = PowerGenerator::new(
                name.as_str(),
                character.as_str(),
                *volume,
                ring.clone(),
                timings,
            );
            if let Some(interval) = ring_interval {
                trigger = trigger.with_ring_interval(seconds(*interval));
            }
            if let Some(delay) = ring_delay {
                trigger = trigger.with_ring_delay(seconds(*delay));
            }
            if let Some(effect) = effect {
                trigger = trigger.with_effect(effect.as_str());
            }
            if let Some(indicator) = indicator {
                trigger = trigger.with_indicator(indicator.as_str());
            }
            for cue in activation_cues {
                trigger = trigger.with_activation_cue(cue.clone());
            }
            if let Some(cue) = answer_cue {
                trigger = trigger.with_answer_cue(cue.clone());
            }
            if let Some(door) = door {
                trigger = trigger.with_door(door.as_str());
            }
            Box::new(trigger)
        }
    }
}

/// Build a director for `scene` over `stage`.
///
/// Fails on duplicate character or trigger names. Other problems
/// (unknown characters, missing handles) surface when the affected
/// interaction runs; use [`SceneFile::validate`] to find them up front.
pub fn build_director<S: Stage>(scene: &SceneFile, stage: S) -> DialogueResult<Director<S>> {
    let config = engine_config(&scene.settings);
    let timings = config.triggers.clone();
    let registry = CharacterRegistry::from_profiles(scene.characters.iter().cloned())?;
    let mut director = Director::new(config, registry, stage);
    for spec in &scene.triggers {
        director.add_boxed_trigger(build_trigger(spec, &timings))?;
    }
    tracing::info!(
        scene = %scene.name,
        characters = scene.characters.len(),
        triggers = scene.triggers.len(),
        "scene built"
    );
    Ok(director)
}
