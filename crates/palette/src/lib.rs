//! Command palette projection.
//!
//! The palette is a flat list of `(command id, category)` entries. It does
//! not own commands: ids are resolved against a [`CommandRegistry`] only
//! when searching or executing, so an entry may name a command that does
//! not exist yet.

use std::cell::{Cell, RefCell};
use std::fmt;

use cmdpanel_commands::{CommandError, CommandRegistry};
use cmdpanel_logger as logger;
use serde_json::Value;
use thiserror::Error;

/// Handle returned by [`Palette::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteItemId(u64);

impl fmt::Display for PaletteItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "palette item {}", self.0)
    }
}

/// A command reference shown under a category.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteItem {
    /// Command id (resolved at invocation time)
    pub command: String,
    /// Display category, e.g. "Tutorial"
    pub category: String,
    /// Arguments passed when the item is executed
    pub args: Value,
}

impl PaletteItem {
    /// Create an item with empty (`{}`) arguments.
    pub fn new(command: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            category: category.into(),
            args: Value::Object(Default::default()),
        }
    }

    /// Set arguments (builder).
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }
}

/// A stored item together with its handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub id: PaletteItemId,
    pub item: PaletteItem,
}

/// Entries sharing a category.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteGroup {
    pub category: String,
    pub entries: Vec<PaletteEntry>,
}

/// A search hit with its label resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteMatch {
    pub id: PaletteItemId,
    pub command: String,
    pub category: String,
    /// Command label, or the id when the command is not registered
    pub label: String,
    /// Caption, empty when the command is not registered
    pub caption: String,
    pub enabled: bool,
}

/// Errors from [`Palette::execute`].
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("{0} not found")]
    UnknownItem(PaletteItemId),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Flat, category-grouped listing of command references.
#[derive(Debug, Default)]
pub struct Palette {
    items: RefCell<Vec<PaletteEntry>>,
    next_id: Cell<u64>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an item. The command id is not validated.
    pub fn add_item(&self, item: PaletteItem) -> PaletteItemId {
        let id = PaletteItemId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        logger::debug(format!(
            "Palette item added: {} [{}]",
            item.command, item.category
        ));
        self.items.borrow_mut().push(PaletteEntry { id, item });
        id
    }

    /// Remove an item. Returns false if it was not present.
    pub fn remove_item(&self, id: PaletteItemId) -> bool {
        let mut items = self.items.borrow_mut();
        let before = items.len();
        items.retain(|entry| entry.id != id);
        items.len() != before
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// All entries sorted by category, insertion order within a category.
    pub fn list_all(&self) -> Vec<PaletteEntry> {
        let mut entries = self.items.borrow().clone();
        // Stable sort keeps insertion order among equal categories
        entries.sort_by(|a, b| a.item.category.cmp(&b.item.category));
        entries
    }

    /// Entries grouped by category, groups in category order.
    pub fn list_by_category(&self) -> Vec<PaletteGroup> {
        let mut groups: Vec<PaletteGroup> = Vec::new();
        for entry in self.list_all() {
            match groups.last_mut() {
                Some(group) if group.category == entry.item.category => group.entries.push(entry),
                _ => groups.push(PaletteGroup {
                    category: entry.item.category.clone(),
                    entries: vec![entry],
                }),
            }
        }
        groups
    }

    /// Entries of a single category, in insertion order.
    pub fn list_category(&self, category: &str) -> Vec<PaletteEntry> {
        self.items
            .borrow()
            .iter()
            .filter(|entry| entry.item.category == category)
            .cloned()
            .collect()
    }

    /// Distinct categories in sorted order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .items
            .borrow()
            .iter()
            .map(|entry| entry.item.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Case-insensitive search over `"<category> <label>"`.
    ///
    /// Every whitespace-separated term of `query` must occur. An empty
    /// query matches everything. Registered commands that are not visible
    /// for the item's arguments are left out.
    pub fn search(&self, query: &str, registry: &CommandRegistry) -> Vec<PaletteMatch> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        self.list_all()
            .into_iter()
            .filter_map(|entry| {
                let PaletteEntry { id, item } = entry;
                let command = registry.command(&item.command);

                if let Some(command) = &command {
                    if !command.is_visible(&item.args) {
                        return None;
                    }
                }

                let label = command
                    .as_ref()
                    .map(|c| c.label().to_string())
                    .filter(|label| !label.is_empty())
                    .unwrap_or_else(|| item.command.clone());
                let haystack = format!("{} {}", item.category, label).to_lowercase();
                if !terms.iter().all(|term| haystack.contains(term.as_str())) {
                    return None;
                }

                Some(PaletteMatch {
                    id,
                    caption: command
                        .as_ref()
                        .map(|c| c.caption().to_string())
                        .unwrap_or_default(),
                    enabled: command.as_ref().is_some_and(|c| c.is_enabled(&item.args)),
                    command: item.command,
                    category: item.category,
                    label,
                })
            })
            .collect()
    }

    /// Execute the command an item refers to, with the item's arguments.
    pub fn execute(
        &self,
        id: PaletteItemId,
        registry: &CommandRegistry,
    ) -> Result<Value, PaletteError> {
        // Clone out so the handler may mutate the palette.
        let item = self
            .items
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.item.clone())
            .ok_or(PaletteError::UnknownItem(id))?;

        Ok(registry.execute(&item.command, &item.args)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdpanel_commands::CommandOptions;
    use serde_json::json;
    use std::rc::Rc;

    fn registry_with(ids: &[(&str, &str)]) -> CommandRegistry {
        let registry = CommandRegistry::new();
        for (id, label) in ids {
            registry
                .add_command(*id, CommandOptions::action(|_| Ok(())).label(*label))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_list_all_sorts_by_category_then_insertion() {
        let palette = Palette::new();
        palette.add_item(PaletteItem::new("z:one", "Tutorial"));
        palette.add_item(PaletteItem::new("a:two", "Edit"));
        palette.add_item(PaletteItem::new("b:three", "Tutorial"));
        palette.add_item(PaletteItem::new("c:four", "Edit"));

        let commands: Vec<_> = palette
            .list_all()
            .into_iter()
            .map(|e| e.item.command)
            .collect();
        assert_eq!(commands, vec!["a:two", "c:four", "z:one", "b:three"]);
        assert_eq!(palette.categories(), vec!["Edit", "Tutorial"]);
    }

    #[test]
    fn test_list_by_category_groups() {
        let palette = Palette::new();
        palette.add_item(PaletteItem::new("x", "B"));
        palette.add_item(PaletteItem::new("y", "A"));
        palette.add_item(PaletteItem::new("z", "B"));

        let groups = palette.list_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "A");
        assert_eq!(groups[1].entries.len(), 2);
        assert_eq!(palette.list_category("B").len(), 2);
        assert!(palette.list_category("C").is_empty());
    }

    #[test]
    fn test_same_command_in_many_entries_and_removal() {
        let palette = Palette::new();
        let first = palette.add_item(PaletteItem::new("cmd", "One"));
        palette.add_item(PaletteItem::new("cmd", "Two"));
        assert_eq!(palette.len(), 2);

        assert!(palette.remove_item(first));
        assert!(!palette.remove_item(first));
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_dangling_id_fails_only_at_execute() {
        let palette = Palette::new();
        let registry = CommandRegistry::new();
        let id = palette.add_item(PaletteItem::new("later:cmd", "Tutorial"));

        let err = palette.execute(id, &registry).unwrap_err();
        assert!(matches!(
            err,
            PaletteError::Command(CommandError::Unknown { .. })
        ));

        registry
            .add_command("later:cmd", CommandOptions::new(|_| Ok(json!("ran"))))
            .unwrap();
        assert_eq!(palette.execute(id, &registry).unwrap(), json!("ran"));
    }

    #[test]
    fn test_execute_passes_item_args() {
        let palette = Palette::new();
        let registry = CommandRegistry::new();
        registry
            .add_command("echo", CommandOptions::new(|args| Ok(args.clone())))
            .unwrap();

        let id = palette.add_item(PaletteItem::new("echo", "Misc").with_args(json!({ "n": 1 })));
        assert_eq!(palette.execute(id, &registry).unwrap(), json!({ "n": 1 }));

        palette.remove_item(id);
        assert!(matches!(
            palette.execute(id, &registry),
            Err(PaletteError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_search_terms_and_labels() {
        let registry = registry_with(&[("ex2:tutorial", "Open Tutorial"), ("edit:copy", "Copy")]);
        let palette = Palette::new();
        palette.add_item(PaletteItem::new("ex2:tutorial", "Tutorial"));
        palette.add_item(PaletteItem::new("edit:copy", "Edit"));
        palette.add_item(PaletteItem::new("ghost:cmd", "Tutorial"));

        let all = palette.search("", &registry);
        assert_eq!(all.len(), 3);

        let hits = palette.search("tut OPEN", &registry);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "Open Tutorial");
        assert!(hits[0].enabled);

        let ghost = palette.search("ghost", &registry);
        assert_eq!(ghost.len(), 1);
        assert_eq!(ghost[0].label, "ghost:cmd");
        assert!(!ghost[0].enabled);
    }

    #[test]
    fn test_search_skips_invisible_commands() {
        let registry = CommandRegistry::new();
        registry
            .add_command(
                "hidden",
                CommandOptions::action(|_| Ok(())).visible_when(|_| false),
            )
            .unwrap();
        let palette = Palette::new();
        palette.add_item(PaletteItem::new("hidden", "Misc"));

        assert!(palette.search("", &registry).is_empty());
    }

    #[test]
    fn test_handler_may_add_palette_items() {
        let palette = Rc::new(Palette::new());
        let registry = CommandRegistry::new();
        {
            let palette = Rc::downgrade(&palette);
            registry
                .add_command(
                    "grow",
                    CommandOptions::action(move |_| {
                        let palette = palette
                            .upgrade()
                            .ok_or_else(|| anyhow::anyhow!("palette dropped"))?;
                        palette.add_item(PaletteItem::new("grow", "More"));
                        Ok(())
                    }),
                )
                .unwrap();
        }

        let id = palette.add_item(PaletteItem::new("grow", "Misc"));
        palette.execute(id, &registry).unwrap();
        assert_eq!(palette.len(), 2);
    }
}
