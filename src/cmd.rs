mod args;
mod command;
mod subcommand;

pub use self::command::*;
pub use self::subcommand::*;
