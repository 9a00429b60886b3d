use std::time::Duration;

use cl_core::Cue;

use crate::context::Effects;
use crate::error::{ConfigError, DialogueResult};
use crate::event::EventKind;
use crate::timer::Timer;

#[derive(Debug, Clone, Copy)]
enum RingPhase {
    /// The ring clip is playing.
    Sounding(Timer),
    /// Silence between rings.
    Gap(Timer),
}

/// A repeating ring: play the clip, wait for it to finish, wait the
/// interval, play again. Runs until cancelled.
#[derive(Debug, Clone)]
pub struct RingLoop {
    cue: Cue,
    interval: Duration,
    phase: Option<RingPhase>,
    rings: u32,
}

impl RingLoop {
    /// A stopped ring loop.
    pub fn new(cue: Cue, interval: Duration) -> Self {
        Self {
            cue,
            interval,
            phase: None,
            rings: 0,
        }
    }

    /// The cue rung.
    pub fn cue(&self) -> &Cue {
        &self.cue
    }

    /// Whether the loop is running.
    pub fn is_ringing(&self) -> bool {
        self.phase.is_some()
    }

    /// Rings sounded since the loop last started.
    pub fn rings(&self) -> u32 {
        self.rings
    }

    /// Start ringing. Fails when the stage does not know how long the
    /// ring clip is, since the loop could never schedule the next ring.
    pub fn start(&mut self, fx: &mut Effects<'_>, owner: &str) -> DialogueResult<()> {
        if self.is_ringing() {
            return Ok(());
        }
        let Some(length) = fx.stage.clip_length(&self.cue.clip) else {
            return Err(ConfigError::UnknownClipLength {
                trigger: owner.to_string(),
                clip: self.cue.clip.to_string(),
            }
            .into());
        };
        self.rings = 0;
        tracing::info!(trigger = owner, cue = %self.cue, "ringing");
        fx.emit(
            EventKind::RingStarted {
                trigger: owner.to_string(),
            },
            format!("{owner}: ringing"),
        );
        self.sound(fx, owner, Timer::new(length));
        Ok(())
    }

    /// Advance the loop by `dt`.
    pub fn tick(&mut self, fx: &mut Effects<'_>, owner: &str, dt: Duration) {
        match &mut self.phase {
            None => {}
            Some(RingPhase::Sounding(timer)) => {
                if timer.tick(dt) {
                    let gap = timer.then(self.interval);
                    self.phase = Some(RingPhase::Gap(gap));
                }
            }
            Some(RingPhase::Gap(timer)) => {
                if timer.tick(dt) {
                    let length = fx.stage.clip_length(&self.cue.clip).unwrap_or_default();
                    let next = timer.then(length);
                    self.sound(fx, owner, next);
                }
            }
        }
    }

    /// Stop ringing and silence the channel. Safe to call when stopped.
    pub fn cancel(&mut self, fx: &mut Effects<'_>, owner: &str) {
        let was_ringing = self.phase.take().is_some();
        if was_ringing || fx.stage.is_playing(&self.cue.channel) {
            fx.stage.stop(&self.cue.channel);
        }
        if was_ringing {
            tracing::debug!(trigger = owner, rings = self.rings, "ring cancelled");
            fx.emit(
                EventKind::RingCancelled {
                    trigger: owner.to_string(),
                },
                format!("{owner}: ring cancelled after {}", self.rings),
            );
        }
    }

    fn sound(&mut self, fx: &mut Effects<'_>, owner: &str, clip: Timer) {
        fx.stage.play_once(&self.cue.channel, &self.cue.clip);
        self.rings += 1;
        fx.emit(
            EventKind::Ring {
                trigger: owner.to_string(),
                count: self.rings,
            },
            format!("{owner}: ring {}", self.rings),
        );
        self.phase = Some(RingPhase::Sounding(clip));
    }
}
