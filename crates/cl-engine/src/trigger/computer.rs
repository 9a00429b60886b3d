use std::any::Any;
use std::time::Duration;

use cl_core::{Cue, SurfaceId, Volume};

use super::{Proximity, RangeChange, Trigger, commit};
use crate::config::TriggerTimings;
use crate::context::TickContext;
use crate::conversation::EntryMode;
use crate::error::DialogueResult;
use crate::event::EventKind;
use crate::timer::Timer;

const DEFAULT_PROMPT: &str = "ID REQUIRED";
const DEFAULT_CONFIRM: &str = "ACCESS GRANTED";

/// Alternates confirm text and blank, one hold per step.
#[derive(Debug, Clone)]
struct FlashSequence {
    step: u32,
    steps: u32,
    hold: Duration,
    timer: Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flash {
    Hold,
    Confirm,
    Blank,
    Done,
}

impl FlashSequence {
    fn new(cycles: u32, hold: Duration) -> Self {
        Self {
            step: 0,
            steps: cycles.saturating_mul(2),
            hold,
            timer: Timer::new(hold),
        }
    }

    fn tick(&mut self, dt: Duration) -> Flash {
        if !self.timer.tick(dt) {
            return Flash::Hold;
        }
        self.step += 1;
        if self.step >= self.steps {
            return Flash::Done;
        }
        self.timer = self.timer.then(self.hold);
        if self.step % 2 == 0 {
            Flash::Confirm
        } else {
            Flash::Blank
        }
    }
}

/// Access terminal: shows a prompt in range, flashes a confirmation on
/// advance, then opens a computer-mode conversation.
#[derive(Debug, Clone)]
pub struct ComputerTrigger {
    name: String,
    character: String,
    proximity: Proximity,
    message_surface: SurfaceId,
    prompt: String,
    confirm: String,
    enter_cue: Option<Cue>,
    flash_hold: Duration,
    flash_cycles: u32,
    flash: Option<FlashSequence>,
    access_granted: bool,
}

impl ComputerTrigger {
    /// A terminal over `volume` writing to `message_surface`.
    pub fn new(
        name: impl Into<String>,
        character: impl Into<String>,
        volume: Volume,
        message_surface: SurfaceId,
        timings: &TriggerTimings,
    ) -> Self {
        Self {
            name: name.into(),
            character: character.into(),
            proximity: Proximity::new(volume, true),
            message_surface,
            prompt: DEFAULT_PROMPT.to_string(),
            confirm: DEFAULT_CONFIRM.to_string(),
            enter_cue: None,
            flash_hold: timings.flash_step,
            flash_cycles: timings.flash_cycles,
            flash: None,
            access_granted: false,
        }
    }

    /// Whether the player must stand inside the volume to press advance.
    pub fn with_require_range(mut self, require: bool) -> Self {
        self.proximity = Proximity::new(self.proximity.volume(), require);
        self
    }

    /// Replace the prompt text.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Replace the confirmation text.
    pub fn with_confirm(mut self, confirm: impl Into<String>) -> Self {
        self.confirm = confirm.into();
        self
    }

    /// Sound played when advance is pressed.
    pub fn with_enter_cue(mut self, cue: Cue) -> Self {
        self.enter_cue = Some(cue);
        self
    }

    /// Whether the conversation has been opened.
    pub fn access_granted(&self) -> bool {
        self.access_granted
    }

    /// Whether the confirmation flash is running.
    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    fn show_prompt(&self, ctx: &mut TickContext<'_>) {
        ctx.fx.stage.set_visible(&self.message_surface, true);
        ctx.fx.stage.set_text(&self.message_surface, &self.prompt);
        ctx.fx.emit(
            EventKind::PromptShown {
                trigger: self.name.clone(),
            },
            format!("{}: {}", self.name, self.prompt),
        );
    }

    fn clear_message(&self, ctx: &mut TickContext<'_>) {
        ctx.fx.stage.set_text(&self.message_surface, "");
        ctx.fx.stage.set_visible(&self.message_surface, false);
    }

    fn attempt(&mut self, ctx: &mut TickContext<'_>) {
        self.flash = None;
        self.clear_message(ctx);
        if commit(ctx, &self.name, &self.character, EntryMode::Computer).is_some() {
            self.access_granted = true;
        } else if self.proximity.in_range() {
            self.show_prompt(ctx);
        }
    }
}

impl Trigger for ComputerTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn character(&self) -> &str {
        &self.character
    }

    fn init(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        self.clear_message(ctx);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        let change = self.proximity.update(ctx.player);
        if let Some(flash) = self.flash.as_mut() {
            // The terminal owns the key until the flash resolves.
            ctx.consume_advance();
            match flash.tick(ctx.dt) {
                Flash::Hold => {}
                Flash::Confirm => ctx.fx.stage.set_text(&self.message_surface, &self.confirm),
                Flash::Blank => ctx.fx.stage.set_text(&self.message_surface, ""),
                Flash::Done => self.attempt(ctx),
            }
            return Ok(());
        }

        match change {
            RangeChange::Entered if !self.access_granted => self.show_prompt(ctx),
            RangeChange::Exited => self.clear_message(ctx),
            _ => {}
        }

        if !self.access_granted && self.proximity.eligible() && ctx.consume_advance() {
            if let Some(cue) = &self.enter_cue {
                ctx.fx.stage.play_once(&cue.channel, &cue.clip);
            }
            tracing::info!(trigger = %self.name, "access flash");
            ctx.fx.stage.set_visible(&self.message_surface, true);
            ctx.fx.stage.set_text(&self.message_surface, &self.confirm);
            ctx.fx.emit(
                EventKind::FlashStarted {
                    trigger: self.name.clone(),
                },
                format!("{}: {}", self.name, self.confirm),
            );
            self.flash = Some(FlashSequence::new(self.flash_cycles, self.flash_hold));
        }
        Ok(())
    }

    fn force_commit(&mut self, ctx: &mut TickContext<'_>) -> DialogueResult<()> {
        if self.access_granted {
            tracing::debug!(trigger = %self.name, "access already granted");
            return Ok(());
        }
        self.attempt(ctx);
        Ok(())
    }

    fn is_committed(&self) -> bool {
        self.access_granted
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use cl_core::{CharacterProfile, Vec2};

    use super::*;
    use crate::trigger::testing::Harness;

    fn profiles() -> Vec<CharacterProfile> {
        vec![
            CharacterProfile::new("Mainframe")
                .with_sentence("Welcome, operator.")
                .with_surface("mf.text")
                .with_animator("mf.box"),
            CharacterProfile::new("Apollo")
                .with_sentence("Busy.")
                .with_surface("apollo.text")
                .with_animator("apollo.box"),
        ]
    }

    fn terminal() -> ComputerTrigger {
        ComputerTrigger::new(
            "lobby-terminal",
            "Mainframe",
            Volume::new(Vec2::new(10.0, 0.0), 1.5),
            SurfaceId::new("terminal.msg"),
            &TriggerTimings::default(),
        )
    }

    #[test]
    fn prompt_follows_range() {
        let mut h = Harness::new(profiles());
        let mut t = terminal();
        h.init(&mut t);
        h.player = Vec2::new(10.0, 1.0);
        h.step(&mut t, false);
        assert_eq!(h.stage.text("terminal.msg"), "ID REQUIRED");
        assert!(h.stage.is_visible("terminal.msg"));
        h.player = Vec2::new(0.0, 0.0);
        h.step(&mut t, false);
        assert_eq!(h.stage.text("terminal.msg"), "");
        assert!(!h.stage.is_visible("terminal.msg"));
    }

    #[test]
    fn flash_holds_the_advance_key() {
        let mut h = Harness::new(profiles());
        let mut t = terminal();
        h.init(&mut t);
        h.player = Vec2::new(10.0, 0.0);
        h.step(&mut t, false);
        h.step(&mut t, true);
        assert!(t.is_flashing());
        assert!(!h.step(&mut t, true), "press during the flash leaked");
        assert!(t.is_flashing());
    }

    #[test]
    fn flash_then_computer_conversation() {
        let mut h = Harness::new(profiles());
        let mut t = terminal().with_enter_cue(Cue::new("sfx", "beep"));
        h.init(&mut t);
        h.player = Vec2::new(10.0, 0.0);
        h.step(&mut t, false);
        h.step(&mut t, true);
        assert!(t.is_flashing());
        assert_eq!(h.stage.play_count("beep"), 1);

        h.run(&mut t, Duration::from_millis(1050));
        assert!(t.access_granted());
        assert_eq!(h.engine.active_character(), Some("Mainframe"));
        assert_eq!(
            h.engine.session().map(|s| s.mode()),
            Some(EntryMode::Computer)
        );
        assert_eq!(
            h.stage.text_history("terminal.msg"),
            vec!["", "ID REQUIRED", "ACCESS GRANTED", "", "ACCESS GRANTED", "", ""]
        );
        assert!(!h.stage.is_visible("terminal.msg"));
    }

    #[test]
    fn denied_flash_restores_prompt() {
        let mut h = Harness::new(profiles());
        let mut t = terminal().with_prompt("BADGE?");
        h.init(&mut t);
        h.with(false, Duration::ZERO, |ctx| {
            ctx.conversations
                .start_conversation(&mut ctx.fx, "Apollo", EntryMode::Direct)
                .unwrap();
        });
        h.player = Vec2::new(10.0, 0.0);
        h.step(&mut t, true);
        h.run(&mut t, Duration::from_millis(1050));
        assert!(!t.access_granted());
        assert!(!t.is_flashing());
        assert_eq!(h.stage.text("terminal.msg"), "BADGE?");
        assert_eq!(h.engine.active_character(), Some("Apollo"));
    }
}
