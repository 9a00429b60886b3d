use std::time::Duration;

use cl_core::ChannelId;

use crate::conversation::EntryMode;

/// Top-level configuration for a [`Director`](crate::Director).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time covered by one scheduler tick.
    pub tick_length: Duration,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Conversation timing.
    pub dialogue: DialogueConfig,
    /// Trigger timing.
    pub triggers: TriggerTimings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_length: Duration::from_millis(50),
            max_events: 0,
            dialogue: DialogueConfig::default(),
            triggers: TriggerTimings::default(),
        }
    }
}

impl EngineConfig {
    /// Set the tick length.
    pub fn with_tick_length(mut self, tick_length: Duration) -> Self {
        self.tick_length = tick_length;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the dialogue configuration.
    pub fn with_dialogue(mut self, dialogue: DialogueConfig) -> Self {
        self.dialogue = dialogue;
        self
    }

    /// Replace the trigger timings.
    pub fn with_triggers(mut self, triggers: TriggerTimings) -> Self {
        self.triggers = triggers;
        self
    }
}

/// Typing and pre-typing delays for conversations.
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Characters per second.
    pub typing_speed: f64,
    /// Characters revealed per typing step.
    pub chunk_size: usize,
    /// Wait after the dialogue box opens, common to both modes.
    pub settle_delay: Duration,
    /// Additional wait in computer mode.
    pub computer_delay: Duration,
    /// Additional wait in phone / face-to-face mode.
    pub phone_delay: Duration,
    /// Channel for voice clips; without one, conversations are silent.
    pub voice_channel: Option<ChannelId>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            typing_speed: 50.0,
            chunk_size: 15,
            settle_delay: Duration::from_millis(500),
            computer_delay: Duration::from_secs(1),
            phone_delay: Duration::from_millis(200),
            voice_channel: None,
        }
    }
}

impl DialogueConfig {
    /// Set the typing speed in characters per second.
    pub fn with_typing_speed(mut self, speed: f64) -> Self {
        self.typing_speed = speed;
        self
    }

    /// Set the number of characters revealed per step.
    pub fn with_chunk_size(mut self, chunk: usize) -> Self {
        self.chunk_size = chunk;
        self
    }

    /// Set the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the computer-mode delay.
    pub fn with_computer_delay(mut self, delay: Duration) -> Self {
        self.computer_delay = delay;
        self
    }

    /// Set the phone-mode delay.
    pub fn with_phone_delay(mut self, delay: Duration) -> Self {
        self.phone_delay = delay;
        self
    }

    /// Set the voice channel.
    pub fn with_voice_channel(mut self, channel: impl Into<String>) -> Self {
        self.voice_channel = Some(ChannelId::new(channel));
        self
    }

    /// Time between typing steps: `chunk_size / typing_speed` seconds.
    /// A non-positive speed reveals one chunk per tick.
    pub fn chunk_interval(&self) -> Duration {
        if self.typing_speed.is_nan() || self.typing_speed <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.effective_chunk() as f64 / self.typing_speed)
            .unwrap_or(Duration::ZERO)
    }

    /// Chunk size, never below one character.
    pub fn effective_chunk(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Total wait between opening the box and typing the first sentence.
    pub fn open_delay(&self, mode: EntryMode) -> Duration {
        let mode_delay = match mode {
            EntryMode::Computer => self.computer_delay,
            EntryMode::Direct => self.phone_delay,
        };
        self.settle_delay + mode_delay
    }
}

/// Fixed waits used by entry triggers and the power generator.
#[derive(Debug, Clone)]
pub struct TriggerTimings {
    /// Face-to-face wait between the key press and the commit.
    pub direct_settle: Duration,
    /// How long each half of an access-granted flash lasts.
    pub flash_step: Duration,
    /// Number of confirm/blank cycles before committing.
    pub flash_cycles: u32,
    /// Silence between phone rings.
    pub ring_interval: Duration,
    /// Wait between powering a generator and its first ring.
    pub generator_ring_delay: Duration,
    /// Wait between answering the generator phone and the commit.
    pub answer_delay: Duration,
    /// Wait between the generator commit and its forced advance.
    pub forced_advance_delay: Duration,
}

impl Default for TriggerTimings {
    fn default() -> Self {
        Self {
            direct_settle: Duration::from_millis(100),
            flash_step: Duration::from_millis(250),
            flash_cycles: 2,
            ring_interval: Duration::from_secs(1),
            generator_ring_delay: Duration::from_secs(10),
            answer_delay: Duration::from_millis(100),
            forced_advance_delay: Duration::from_millis(800),
        }
    }
}

impl TriggerTimings {
    /// Set the ring interval.
    pub fn with_ring_interval(mut self, interval: Duration) -> Self {
        self.ring_interval = interval;
        self
    }

    /// Set the generator ring delay.
    pub fn with_generator_ring_delay(mut self, delay: Duration) -> Self {
        self.generator_ring_delay = delay;
        self
    }
}

/// Convert seconds from a scene file to a duration; negative or
/// non-finite values become zero.
pub fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_length, Duration::from_millis(50));
        assert_eq!(config.max_events, 0);
        assert_eq!(config.dialogue.chunk_size, 15);
        assert_eq!(config.triggers.flash_cycles, 2);
    }

    #[test]
    fn chunk_interval_follows_speed() {
        let config = DialogueConfig::default();
        let interval = config.chunk_interval();
        assert!(interval > Duration::from_millis(299));
        assert!(interval < Duration::from_millis(301));

        let stalled = DialogueConfig::default().with_typing_speed(0.0);
        assert_eq!(stalled.chunk_interval(), Duration::ZERO);
        assert_eq!(DialogueConfig::default().with_chunk_size(0).effective_chunk(), 1);
    }

    #[test]
    fn open_delay_per_mode() {
        let config = DialogueConfig::default()
            .with_computer_delay(Duration::from_secs(2))
            .with_phone_delay(Duration::from_millis(300));
        assert_eq!(
            config.open_delay(EntryMode::Computer),
            Duration::from_millis(2500)
        );
        assert_eq!(
            config.open_delay(EntryMode::Direct),
            Duration::from_millis(800)
        );
    }

    #[test]
    fn config_builder_chain() {
        let config = EngineConfig::default()
            .with_tick_length(Duration::from_millis(10))
            .with_max_events(100)
            .with_triggers(TriggerTimings::default().with_ring_interval(Duration::ZERO));
        assert_eq!(config.tick_length, Duration::from_millis(10));
        assert_eq!(config.max_events, 100);
        assert_eq!(config.triggers.ring_interval, Duration::ZERO);
    }

    #[test]
    fn seconds_clamps_invalid() {
        assert_eq!(seconds(1.5), Duration::from_millis(1500));
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
    }
}
