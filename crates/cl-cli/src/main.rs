//! Command-line tools for Comlink scenes: validate a scene file, or play
//! one through the dialogue engine with a scripted input sequence.

mod commands;
mod logging;
mod script;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "comlink",
    about = "Comlink: scripted dialogue scenes on the command line",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scene file and summarise its contents
    Check {
        /// Scene file (JSON)
        scene: PathBuf,
    },

    /// Play a scene with a scripted input sequence
    Play {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Input script (one command per line)
        #[arg(short, long)]
        script: PathBuf,

        /// Also print engine events as they happen
        #[arg(short, long)]
        events: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { scene } => commands::check::run(&scene),
        Commands::Play {
            scene,
            script,
            events,
        } => commands::play::run(&scene, &script, events),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
