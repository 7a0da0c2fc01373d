//! Host application: owns the framework instances and activates features.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use anyhow::{Context, Result};
use cmdpanel_commands::CommandRegistry;
use cmdpanel_config::Config;
use cmdpanel_core::Widget;
use cmdpanel_logger as logger;
use cmdpanel_menu::{render_tree, MenuBar};
use cmdpanel_palette::Palette;
use serde_json::Value;

use crate::features::{builtin_features, Feature};

/// Panels opened by features; the host owns their lifecycle.
pub type OpenPanels = Rc<RefCell<Vec<Box<dyn Widget>>>>;

pub struct App {
    config: Config,
    registry: Rc<CommandRegistry>,
    palette: Rc<Palette>,
    menu_bar: Rc<MenuBar>,
    panels: OpenPanels,
    active_features: Vec<&'static str>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: Rc::new(CommandRegistry::new()),
            palette: Rc::new(Palette::new()),
            menu_bar: Rc::new(MenuBar::new()),
            panels: Rc::new(RefCell::new(Vec::new())),
            active_features: Vec::new(),
        }
    }

    pub fn registry(&self) -> Rc<CommandRegistry> {
        Rc::clone(&self.registry)
    }

    pub fn palette(&self) -> Rc<Palette> {
        Rc::clone(&self.palette)
    }

    pub fn menu_bar(&self) -> Rc<MenuBar> {
        Rc::clone(&self.menu_bar)
    }

    pub fn open_panels(&self) -> OpenPanels {
        Rc::clone(&self.panels)
    }

    /// Ids of activated features, in activation order.
    pub fn active_features(&self) -> &[&'static str] {
        &self.active_features
    }

    /// Activate one feature.
    pub fn activate(&mut self, feature: &dyn Feature) -> Result<()> {
        let id = feature.id();
        if self.active_features.contains(&id) {
            logger::warn(format!("Feature {} is already active", id));
            return Ok(());
        }

        feature
            .activate(self)
            .with_context(|| format!("Failed to activate feature {}", id))?;
        self.active_features.push(id);
        logger::info(format!("Feature activated: {}", id));
        Ok(())
    }

    /// Activate the built-in features listed in `general.features`, in
    /// that order. Unknown names are logged and skipped.
    pub fn activate_configured_features(&mut self) -> Result<()> {
        let builtins = builtin_features();
        let wanted = self.config.general.features.clone();

        for name in wanted {
            match builtins.iter().find(|feature| feature.id() == name) {
                Some(feature) => self.activate(feature.as_ref())?,
                None => logger::warn(format!("Unknown feature in config: {}", name)),
            }
        }
        Ok(())
    }

    /// Execute a command by id.
    pub fn execute(&self, id: &str, args: &Value) -> Result<Value> {
        Ok(self.registry.execute(id, args)?)
    }

    /// Palette grouped by category, one command per line.
    pub fn palette_listing(&self) -> String {
        let mut out = String::new();
        for group in self.palette.list_by_category() {
            let _ = writeln!(out, "{}", group.category);
            for entry in group.entries {
                let command = entry.item.command;
                let label = self
                    .registry
                    .label(&command)
                    .filter(|label| !label.is_empty())
                    .unwrap_or_else(|| command.clone());
                let _ = writeln!(out, "  {:<24} {}", label, command);
            }
        }
        out
    }

    /// Search results, capped at `palette.max_results`.
    pub fn search_listing(&self, query: &str) -> String {
        let mut out = String::new();
        let max_results = self.config.palette.max_results;
        for hit in self
            .palette
            .search(query, &self.registry)
            .into_iter()
            .take(max_results)
        {
            let state = if hit.enabled { "" } else { " (disabled)" };
            let _ = writeln!(
                out,
                "[{}] {} ({}){}",
                hit.category, hit.label, hit.command, state
            );
        }
        out
    }

    /// Menu bar outline.
    pub fn menu_listing(&self) -> String {
        render_tree(&self.menu_bar, &self.registry)
    }

    /// Open panels as `id: label` lines.
    pub fn panel_listing(&self) -> String {
        let mut out = String::new();
        for panel in self.panels.borrow().iter() {
            let title = panel.title();
            let closable = if title.closable { " [x]" } else { "" };
            let _ = writeln!(out, "{}: {}{}", panel.id(), title.label, closable);
        }
        out
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Panels are disposed by the host, not by whichever handler opened them.
        for panel in self.panels.borrow_mut().iter_mut() {
            panel.dispose();
        }
    }
}
