// Subcommand handlers. main.rs parses arguments and dispatches here.

pub mod nearest;
pub mod route;
