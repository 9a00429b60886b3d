use std::path::Path;

use cl_core::{RecordingStage, StageCall};
use cl_engine::scene::{build_director, clip_lengths};
use cl_engine::{Director, InputFrame};
use colored::Colorize;

use crate::script::{self, Step};

/// Output cursor: how much of the stage calls and event log is printed.
struct Printer {
    show_events: bool,
    calls: usize,
    events: usize,
}

impl Printer {
    fn flush(&mut self, director: &Director<RecordingStage>) {
        let time = format!("{:>7.2}s", director.clock().elapsed().as_secs_f64()).dimmed();
        for call in &director.stage().calls()[self.calls..] {
            if let StageCall::SetText { surface, text } = call {
                if text.is_empty() {
                    println!("  {time} {} {}", surface.as_str().cyan(), "(cleared)".dimmed());
                } else {
                    println!("  {time} {} {text}", surface.as_str().cyan());
                }
            }
        }
        self.calls = director.stage().calls().len();

        let events = director.events().events();
        if self.show_events {
            for event in events.iter().skip(self.events) {
                let desc = if event.kind.is_problem() {
                    event.description.yellow()
                } else {
                    event.description.normal()
                };
                println!("  {time} {} {desc}", "event".magenta());
            }
        }
        self.events = events.len();
    }
}

pub fn run(scene_path: &Path, script_path: &Path, show_events: bool) -> Result<(), String> {
    let scene = super::load_scene(scene_path)?;
    let text = std::fs::read_to_string(script_path)
        .map_err(|e| format!("cannot read '{}': {e}", script_path.display()))?;
    let steps = script::parse(&text)?;

    let stage = RecordingStage::new().with_clips(clip_lengths(&scene));
    let mut director =
        build_director(&scene, stage).map_err(|e| format!("cannot build scene: {e}"))?;
    director.init();

    let mut player = scene.player_start;
    let mut printer = Printer {
        show_events,
        calls: 0,
        events: 0,
    };
    printer.flush(&director);

    for step in steps {
        tracing::debug!(?step, "script step");
        match step {
            Step::Wait(span) => {
                for _ in 0..director.clock().ticks_for(span) {
                    director.tick(InputFrame::idle(player));
                    printer.flush(&director);
                }
            }
            Step::Move(to) => player = to,
            Step::Press => director.tick(InputFrame::press(player)),
            Step::Start(name, mode) => report(director.start_conversation(&name, mode)),
            Step::Advance => report(director.advance_or_skip()),
            Step::ForceAdvance => report(director.force_advance()),
            Step::End => report(director.end_conversation()),
            Step::Ring(name) => report(director.force_ring(&name)),
            Step::Commit(name) => report(director.force_commit(&name)),
        }
        printer.flush(&director);
    }

    let problems = director.events().count(|k| k.is_problem());
    println!();
    println!(
        "  {} after {} ticks ({:.2}s): conversation {}, {} events, {} problem(s)",
        "Done".bold(),
        director.clock().tick(),
        director.clock().elapsed().as_secs_f64(),
        director.conversations().state(),
        director.events().len(),
        problems
    );
    Ok(())
}

/// Script failures are reported and the script carries on.
fn report<T>(result: cl_engine::DialogueResult<T>) {
    if let Err(e) = result {
        println!("  {} {e}", "refused".yellow().bold());
    }
}
