//! # Command-Line Interface
//!
//! The interactive shell over a [`Database`](crate::database::Database):
//! line reading, meta-commands, and the out-of-process natural-language
//! assistant hook.

mod assistant;
mod commands;
mod repl;

pub use assistant::{AdaAssistant, Translator};
pub use commands::{execute as execute_command, CommandResult};
pub use repl::Repl;
