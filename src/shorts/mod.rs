pub mod cli;
pub mod commands;
mod render;
mod segment;
mod selector;
mod srt;

pub use cli::ShortsCommands;
pub use commands::handle_shorts_command;
