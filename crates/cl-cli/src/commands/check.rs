use std::path::Path;

use cl_core::Severity;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path) -> Result<(), String> {
    let scene = super::load_scene(path)?;
    let issues = scene.validate();

    let title = if scene.name.is_empty() {
        path.display().to_string()
    } else {
        scene.name.clone()
    };
    println!("  {} '{}'", "Scene".bold(), title);
    println!(
        "  {} characters, {} triggers, {} clips",
        scene.characters.len(),
        scene.triggers.len(),
        scene.clips.len()
    );
    println!();

    if !scene.characters.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Character", "Sentences", "Voice", "Surface", "Animator"]);
        for profile in &scene.characters {
            table.add_row(vec![
                profile.name.clone(),
                profile.dialogue.len().to_string(),
                profile.voice_clips.iter().flatten().count().to_string(),
                handle_or_dash(profile.surface.as_ref()),
                handle_or_dash(profile.animator.as_ref()),
            ]);
        }
        println!("{table}");
        println!();
    }

    if !scene.triggers.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Trigger", "Kind", "Character"]);
        for trigger in &scene.triggers {
            table.add_row(vec![
                trigger.name().to_string(),
                trigger.kind().to_string(),
                trigger.character().to_string(),
            ]);
        }
        println!("{table}");
        println!();
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    for issue in &issues {
        let label = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {label}: {}: {}", issue.subject, issue.message);
    }

    if errors > 0 {
        return Err(format!("{errors} error(s) in scene"));
    }
    if issues.is_empty() {
        println!("  {}", "All checks passed.".green());
    } else {
        println!("  Passed with {} warning(s).", issues.len());
    }
    Ok(())
}

fn handle_or_dash(handle: Option<&impl std::fmt::Display>) -> String {
    handle.map_or_else(|| "-".to_string(), ToString::to_string)
}
