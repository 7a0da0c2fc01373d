//! Feature modules activated by the host.
//!
//! Each feature receives the already-constructed registry, palette and
//! menu bar through [`App`] and registers against them explicitly.

mod commands_and_menus;
mod signals_and_buttons;

use anyhow::Result;

use crate::app::App;

pub use commands_and_menus::CommandsAndMenus;
pub use signals_and_buttons::SignalsAndButtons;
#[cfg(test)]
pub use signals_and_buttons::{TutorialPanel, TutorialView};

/// Palette category and menu title shared by the tutorial features.
pub const TUTORIAL_CATEGORY: &str = "Tutorial";

/// A unit of functionality the host can activate.
pub trait Feature {
    /// Name used in `general.features`.
    fn id(&self) -> &'static str;

    /// Register commands, palette items, menus.
    fn activate(&self, app: &mut App) -> Result<()>;
}

/// Features shipped with the host, in default activation order.
pub fn builtin_features() -> Vec<Box<dyn Feature>> {
    vec![
        Box::new(CommandsAndMenus::new()),
        Box::new(SignalsAndButtons::new()),
    ]
}
