pub mod allocator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod reservations;

pub use cli::ScheduleCommands;
pub use commands::handle_schedule_command;
