//! Tutorial panel whose child view reports clicks through a signal.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result};
use cmdpanel_commands::CommandOptions;
use cmdpanel_core::{Title, Widget};
use cmdpanel_logger as logger;
use cmdpanel_menu::{create_menu, MenuItem};
use cmdpanel_palette::PaletteItem;
use cmdpanel_panel::Panel;
use cmdpanel_signal::{Connection, Signal};
use serde_json::json;

use super::{Feature, TUTORIAL_CATEGORY};
use crate::app::{App, OpenPanels};

pub const OPEN_PANEL_COMMAND: &str = "ex5:open-panel";
pub const CLICK_COMMAND: &str = "ex5:click";
pub const CLOSE_PANEL_COMMAND: &str = "ex5:close-panel";

/// Style class added to tutorial panels.
const PANEL_CLASS: &str = "cmdpanel-TutorialPanel";

/// Leaf widget with a single button; each click changes its state.
pub struct TutorialView {
    title: Title,
    clicks: Cell<u32>,
    state_changed: Signal<TutorialView, u32>,
}

impl TutorialView {
    pub const ID: &'static str = "TutorialView";

    pub fn new() -> Self {
        Self {
            title: Title::new("Tutorial"),
            clicks: Cell::new(0),
            state_changed: Signal::new(),
        }
    }

    /// Press the button. Emits `state_changed` with the new click count.
    pub fn click(&self) {
        let clicks = self.clicks.get() + 1;
        self.clicks.set(clicks);
        self.state_changed.emit(self, &clicks);
    }

    pub fn clicks(&self) -> u32 {
        self.clicks.get()
    }

    pub fn state_changed(&self) -> &Signal<TutorialView, u32> {
        &self.state_changed
    }
}

impl Default for TutorialView {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TutorialView {
    fn id(&self) -> &str {
        Self::ID
    }

    fn title(&self) -> &Title {
        &self.title
    }

    fn title_mut(&mut self) -> &mut Title {
        &mut self.title
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Closable panel owning one [`TutorialView`].
///
/// Subscribes to the view's `state_changed` once, at construction; the
/// subscription lives as long as the view, i.e. as long as the panel.
pub struct TutorialPanel {
    panel: Panel,
    changes: Rc<RefCell<Vec<u32>>>,
    connection: Connection,
}

impl TutorialPanel {
    pub const ID: &'static str = "TutorialPanel";

    pub fn new() -> Self {
        let mut panel = Panel::new(Self::ID);
        {
            let title = panel.title_mut();
            title.label = "Tutorial View".to_string();
            title.closable = true;
            title.class_name = PANEL_CLASS.to_string();
        }

        let view = TutorialView::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let connection = {
            let changes = Rc::clone(&changes);
            view.state_changed()
                .connect(move |_: &TutorialView, clicks: &u32| {
                    logger::info("changed");
                    changes.borrow_mut().push(*clicks);
                    Ok(())
                })
        };
        panel.add_widget(Box::new(view));

        Self {
            panel,
            changes,
            connection,
        }
    }

    /// The owned view.
    pub fn view(&self) -> Option<&TutorialView> {
        self.panel.find_widget::<TutorialView>()
    }

    /// Click counts observed through the view's signal, in order.
    pub fn observed_changes(&self) -> Vec<u32> {
        self.changes.borrow().clone()
    }

    /// Whether the subscription to the view is still alive.
    #[cfg(test)]
    pub fn is_observing(&self) -> bool {
        self.connection.is_connected()
    }

    #[cfg(test)]
    pub fn panel(&self) -> &Panel {
        &self.panel
    }
}

impl Default for TutorialPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TutorialPanel {
    fn id(&self) -> &str {
        self.panel.id()
    }

    fn title(&self) -> &Title {
        self.panel.title()
    }

    fn title_mut(&mut self) -> &mut Title {
        self.panel.title_mut()
    }

    fn dispose(&mut self) {
        self.connection.disconnect();
        self.panel.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.panel.is_disposed()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn find_tutorial_panel(panels: &[Box<dyn Widget>]) -> Option<&TutorialPanel> {
    panels
        .iter()
        .find_map(|panel| panel.as_any().downcast_ref::<TutorialPanel>())
}

/// Registers commands that open, click and close tutorial panels.
#[derive(Default)]
pub struct SignalsAndButtons;

impl SignalsAndButtons {
    pub fn new() -> Self {
        Self
    }
}

impl Feature for SignalsAndButtons {
    fn id(&self) -> &'static str {
        "signals_and_buttons"
    }

    fn activate(&self, app: &mut App) -> Result<()> {
        let registry = app.registry();

        let panels: OpenPanels = app.open_panels();
        registry.add_command(
            OPEN_PANEL_COMMAND,
            CommandOptions::new(move |_| {
                let mut panels = panels
                    .try_borrow_mut()
                    .context("Open panels are busy")?;
                panels.push(Box::new(TutorialPanel::new()));
                Ok(json!({ "panel": TutorialPanel::ID, "open": panels.len() }))
            })
            .label("Open Tutorial Panel")
            .caption("Open a panel that logs every state change of its view"),
        )?;

        let panels: OpenPanels = app.open_panels();
        let has_panel = {
            let panels = panels.clone();
            move |_: &serde_json::Value| match panels.try_borrow() {
                Ok(panels) => find_tutorial_panel(&panels).is_some(),
                Err(_) => false,
            }
        };
        registry.add_command(
            CLICK_COMMAND,
            CommandOptions::new(move |_| {
                // Shared borrow only: subscribers of the view may re-enter
                // the registry while the click is delivered.
                let panels = panels.try_borrow().context("Open panels are busy")?;
                let panel = find_tutorial_panel(&panels).context("No tutorial panel is open")?;
                let view = panel.view().context("Tutorial panel has no view")?;
                view.click();
                Ok(json!({
                    "clicks": view.clicks(),
                    "observed": panel.observed_changes(),
                }))
            })
            .label("Click Tutorial Button")
            .enabled_when(has_panel),
        )?;

        let panels: OpenPanels = app.open_panels();
        registry.add_command(
            CLOSE_PANEL_COMMAND,
            CommandOptions::new(move |_| {
                let mut panels = panels
                    .try_borrow_mut()
                    .context("Open panels are busy")?;
                let before = panels.len();
                panels.retain_mut(|panel| {
                    if panel.title().closable {
                        panel.dispose();
                        false
                    } else {
                        true
                    }
                });
                Ok(json!({ "closed": before - panels.len() }))
            })
            .label("Close Tutorial Panels"),
        )?;

        let palette = app.palette();
        for command in [OPEN_PANEL_COMMAND, CLICK_COMMAND, CLOSE_PANEL_COMMAND] {
            palette.add_item(PaletteItem::new(command, TUTORIAL_CATEGORY));
        }

        let menu_bar = app.menu_bar();
        let menu = match menu_bar.find_menu(TUTORIAL_CATEGORY) {
            Some(menu) => menu,
            None => {
                let menu = create_menu(TUTORIAL_CATEGORY);
                menu_bar.add_menu(menu.clone(), None);
                menu
            }
        };
        let panels_menu = create_menu("Panels");
        panels_menu.add_item(MenuItem::new(OPEN_PANEL_COMMAND).with_rank(1));
        panels_menu.add_item(MenuItem::new(CLICK_COMMAND).with_rank(2));
        panels_menu.add_separator(3);
        panels_menu.add_item(MenuItem::new(CLOSE_PANEL_COMMAND).with_rank(4));
        menu.add_submenu(panels_menu, None)?;

        Ok(())
    }
}
