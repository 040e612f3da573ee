mod common;
mod schedule;
mod shorts;
mod timeline;
mod ui;

use clap::{Parser, Subcommand};

use crate::schedule::ScheduleCommands;
use crate::shorts::ShortsCommands;
use crate::ui::prelude::{Level, OutputFormat, emit};

/// Shortcast main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit machine-readable JSON events instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Highlight clip selection and rendering
    Shorts {
        #[command(subcommand)]
        command: ShortsCommands,
    },
    /// Publish slot planning and schedule configuration
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    ui::init(format, true);

    let result = match cli.command {
        Commands::Shorts { command } => shorts::handle_shorts_command(command),
        Commands::Schedule { command } => schedule::handle_schedule_command(command),
    };

    if let Err(err) = result {
        emit(Level::Error, "shortcast.error", &format!("{err:#}"), None);
        std::process::exit(1);
    }
}
