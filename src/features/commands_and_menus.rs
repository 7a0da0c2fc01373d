//! Tutorial command exposed through the palette and the menu bar.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use cmdpanel_commands::CommandOptions;
use cmdpanel_logger as logger;
use cmdpanel_menu::{create_menu, MenuItem};
use cmdpanel_palette::PaletteItem;

use super::{Feature, TUTORIAL_CATEGORY};
use crate::app::App;

pub const TUTORIAL_COMMAND: &str = "ex2:tutorial";
const TUTORIAL_MENU_RANK: i32 = 80;

/// Registers `ex2:tutorial` and projects it into the palette and a
/// "Tutorial" menu.
#[derive(Default)]
pub struct CommandsAndMenus {
    invocations: Rc<Cell<usize>>,
}

impl CommandsAndMenus {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the tutorial command ran.
    #[cfg(test)]
    pub fn invocations(&self) -> usize {
        self.invocations.get()
    }
}

impl Feature for CommandsAndMenus {
    fn id(&self) -> &'static str {
        "commands_and_menus"
    }

    fn activate(&self, app: &mut App) -> Result<()> {
        let invocations = Rc::clone(&self.invocations);
        app.registry().add_command(
            TUTORIAL_COMMAND,
            CommandOptions::action(move |_| {
                invocations.set(invocations.get() + 1);
                logger::info("Hey");
                Ok(())
            })
            .label(TUTORIAL_COMMAND)
            .caption("Open the Labtutorial"),
        )?;

        app.palette()
            .add_item(PaletteItem::new(TUTORIAL_COMMAND, TUTORIAL_CATEGORY));

        let menu = create_menu(TUTORIAL_CATEGORY);
        app.menu_bar().add_menu(menu.clone(), TUTORIAL_MENU_RANK);
        menu.add_item(MenuItem::new(TUTORIAL_COMMAND));

        Ok(())
    }
}
