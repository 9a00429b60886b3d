use std::time::Duration;

use crate::timer::Timer;

/// What a typing step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingStep {
    /// Still waiting for the next step.
    Waiting,
    /// More text became visible.
    Revealed,
    /// The whole sentence is visible and its last interval elapsed.
    Finished,
}

/// An in-progress chunked reveal of one sentence.
///
/// The first chunk is visible as soon as the render starts. Each
/// following chunk appears one interval later; a short final chunk is
/// shown as soon as its turn comes. The render finishes one interval
/// after the last chunk. Dropping the render cancels it.
#[derive(Debug, Clone)]
pub struct TypingRender {
    sentence: String,
    total_chars: usize,
    revealed: usize,
    chunk: usize,
    interval: Duration,
    timer: Timer,
}

impl TypingRender {
    /// Start revealing `sentence`, `chunk` characters per `interval`.
    pub fn start(sentence: impl Into<String>, chunk: usize, interval: Duration) -> Self {
        let sentence = sentence.into();
        let total_chars = sentence.chars().count();
        let chunk = chunk.max(1);
        Self {
            revealed: chunk.min(total_chars),
            sentence,
            total_chars,
            chunk,
            interval,
            timer: Timer::new(interval),
        }
    }

    /// The full sentence.
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// The part of the sentence currently visible.
    pub fn visible(&self) -> &str {
        self.sentence
            .char_indices()
            .nth(self.revealed)
            .map(|(i, _)| &self.sentence[..i])
            .unwrap_or(&self.sentence)
    }

    /// Number of characters currently visible.
    pub fn revealed_chars(&self) -> usize {
        self.revealed
    }

    /// Whether every character is visible.
    pub fn is_fully_revealed(&self) -> bool {
        self.revealed >= self.total_chars
    }

    /// Advance the render by `dt`.
    pub fn tick(&mut self, dt: Duration) -> TypingStep {
        if !self.timer.tick(dt) {
            return TypingStep::Waiting;
        }
        if self.is_fully_revealed() {
            return TypingStep::Finished;
        }
        self.revealed = (self.revealed + self.chunk).min(self.total_chars);
        self.timer = self.timer.then(self.interval);
        TypingStep::Revealed
    }
}
