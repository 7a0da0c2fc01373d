//! Menu errors.

use cmdpanel_commands::CommandError;
use thiserror::Error;

use crate::MenuId;

#[derive(Error, Debug)]
pub enum MenuError {
    /// Attaching the submenu would make the menu tree cyclic
    #[error("Menu {child} cannot be attached under {parent}: it would create a cycle")]
    Cycle { parent: MenuId, child: MenuId },

    /// No child at the requested position
    #[error("Menu {menu} has no entry at index {index}")]
    NoEntry { menu: MenuId, index: usize },

    /// The activated item's command failed or does not exist
    #[error(transparent)]
    Command(#[from] CommandError),
}
