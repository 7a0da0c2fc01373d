//! Command registry for cmdpanel.
//!
//! Feature modules register named commands here; palettes and menus
//! refer to them by id and resolve them only when invoked.

mod command;
mod error;
mod registry;

pub use command::{Command, CommandOptions, Handler, Predicate};
pub use error::CommandError;
pub use registry::{ChangeKind, CommandChanged, CommandExecuted, CommandRegistry};

/// Arguments passed to a command handler.
pub type CommandArgs = serde_json::Value;
