//! Menu nodes and their children.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use cmdpanel_commands::{CommandError, CommandRegistry};
use cmdpanel_core::Title;
use cmdpanel_logger as logger;
use serde_json::Value;

use crate::{sort_by_rank, MenuError};

static NEXT_MENU_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Menu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(u64);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// Leaf entry referencing a command by id.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Command id (resolved at activation time)
    pub command: String,
    /// Arguments passed on activation
    pub args: Value,
    /// Ordering among siblings
    pub rank: Option<i32>,
}

impl MenuItem {
    /// Item with `{}` arguments and no rank.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Value::Object(Default::default()),
            rank: None,
        }
    }

    /// Set rank (builder).
    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Set arguments (builder).
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// Label of the referenced command, or its id when it has none or is
    /// not registered.
    pub fn label(&self, registry: &CommandRegistry) -> String {
        registry
            .label(&self.command)
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| self.command.clone())
    }

    pub fn is_enabled(&self, registry: &CommandRegistry) -> bool {
        registry.is_enabled(&self.command, &self.args)
    }

    pub fn is_visible(&self, registry: &CommandRegistry) -> bool {
        registry.is_visible(&self.command, &self.args)
    }

    pub fn is_toggled(&self, registry: &CommandRegistry) -> bool {
        registry.is_toggled(&self.command, &self.args)
    }

    /// Execute the referenced command with the item's arguments.
    pub fn activate(&self, registry: &CommandRegistry) -> Result<Value, CommandError> {
        registry.execute(&self.command, &self.args)
    }
}

/// A child of a [`Menu`].
#[derive(Debug, Clone)]
pub enum MenuChild {
    Command(MenuItem),
    Submenu { menu: Rc<Menu>, rank: Option<i32> },
    Separator { rank: Option<i32> },
}

impl MenuChild {
    pub fn rank(&self) -> Option<i32> {
        match self {
            MenuChild::Command(item) => item.rank,
            MenuChild::Submenu { rank, .. } | MenuChild::Separator { rank } => *rank,
        }
    }

    fn submenu_id(&self) -> Option<MenuId> {
        match self {
            MenuChild::Submenu { menu, .. } => Some(menu.id()),
            _ => None,
        }
    }
}

/// Ordered snapshot of a menu's children.
///
/// Reflects the menu at the time [`Menu::children`] was called; call it
/// again after a structural change.
pub struct Children {
    inner: std::vec::IntoIter<MenuChild>,
}

impl Iterator for Children {
    type Item = MenuChild;

    fn next(&mut self) -> Option<MenuChild> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Children {}

/// A titled node in the menu tree.
///
/// Shared through `Rc` and mutated through `&self`, so a menu can keep
/// receiving items after it has been attached to a parent.
pub struct Menu {
    id: MenuId,
    title: RefCell<Title>,
    children: RefCell<Vec<MenuChild>>,
}

/// Create a new, empty, parentless menu.
pub fn create_menu(label: impl Into<String>) -> Rc<Menu> {
    Menu::new(label)
}

impl Menu {
    pub fn new(label: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            id: MenuId(NEXT_MENU_ID.fetch_add(1, Ordering::Relaxed)),
            title: RefCell::new(Title::new(label)),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn id(&self) -> MenuId {
        self.id
    }

    pub fn title(&self) -> Ref<'_, Title> {
        self.title.borrow()
    }

    pub fn title_mut(&self) -> RefMut<'_, Title> {
        self.title.borrow_mut()
    }

    /// Shorthand for `title().label`.
    pub fn label(&self) -> String {
        self.title.borrow().label.clone()
    }

    /// Append a command item.
    pub fn add_item(&self, item: MenuItem) {
        logger::debug(format!(
            "Menu '{}': item {} (rank {:?})",
            self.label(),
            item.command,
            item.rank
        ));
        self.children.borrow_mut().push(MenuChild::Command(item));
    }

    /// Append a separator.
    pub fn add_separator(&self, rank: impl Into<Option<i32>>) {
        self.children
            .borrow_mut()
            .push(MenuChild::Separator { rank: rank.into() });
    }

    /// Attach `menu` as a submenu.
    ///
    /// Attaching a menu that is already a child only updates its rank.
    /// Fails if `menu` is this menu or one of its ancestors.
    pub fn add_submenu(
        &self,
        menu: Rc<Menu>,
        rank: impl Into<Option<i32>>,
    ) -> Result<(), MenuError> {
        let rank = rank.into();
        if menu.id == self.id || menu.contains_menu(self.id) {
            return Err(MenuError::Cycle {
                parent: self.id,
                child: menu.id,
            });
        }

        let mut children = self.children.borrow_mut();
        let existing = children
            .iter_mut()
            .find(|child| child.submenu_id() == Some(menu.id));
        match existing {
            Some(MenuChild::Submenu { rank: current, .. }) => *current = rank,
            _ => children.push(MenuChild::Submenu { menu, rank }),
        }
        Ok(())
    }

    /// Whether `id` appears anywhere below this menu.
    pub fn contains_menu(&self, id: MenuId) -> bool {
        self.children.borrow().iter().any(|child| match child {
            MenuChild::Submenu { menu, .. } => menu.id == id || menu.contains_menu(id),
            _ => false,
        })
    }

    /// Remove every item referencing `command`. Returns how many went.
    pub fn remove_command(&self, command: &str) -> usize {
        let mut children = self.children.borrow_mut();
        let before = children.len();
        children.retain(
            |child| !matches!(child, MenuChild::Command(item) if item.command == command),
        );
        before - children.len()
    }

    /// Remove all children.
    pub fn clear_items(&self) {
        self.children.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Children ordered by ascending rank, unranked children last,
    /// insertion order among equals.
    pub fn children(&self) -> Children {
        let mut snapshot = self.children.borrow().clone();
        sort_by_rank(&mut snapshot, MenuChild::rank);
        Children {
            inner: snapshot.into_iter(),
        }
    }

    /// Activate the `index`-th child in [`Menu::children`] order.
    ///
    /// Returns `Ok(None)` for separators and submenus.
    pub fn activate(
        &self,
        index: usize,
        registry: &CommandRegistry,
    ) -> Result<Option<Value>, MenuError> {
        let child = self.children().nth(index).ok_or(MenuError::NoEntry {
            menu: self.id,
            index,
        })?;

        match child {
            MenuChild::Command(item) => Ok(Some(item.activate(registry)?)),
            MenuChild::Submenu { .. } | MenuChild::Separator { .. } => Ok(None),
        }
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("children", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdpanel_commands::CommandOptions;
    use serde_json::json;
    use std::cell::Cell;

    fn commands(menu: &Menu) -> Vec<String> {
        menu.children()
            .map(|child| match child {
                MenuChild::Command(item) => item.command,
                MenuChild::Submenu { menu, .. } => format!("<{}>", menu.label()),
                MenuChild::Separator { .. } => "---".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_create_menu_is_empty() {
        let menu = create_menu("Tutorial");
        assert_eq!(menu.label(), "Tutorial");
        assert!(menu.is_empty());
        assert_eq!(menu.children().len(), 0);
    }

    #[test]
    fn test_children_ordered_by_rank() {
        let menu = Menu::new("Edit");
        menu.add_item(MenuItem::new("unranked-1"));
        menu.add_item(MenuItem::new("r20").with_rank(20));
        menu.add_item(MenuItem::new("r10-a").with_rank(10));
        menu.add_separator(15);
        menu.add_item(MenuItem::new("unranked-2"));
        menu.add_item(MenuItem::new("r10-b").with_rank(10));

        assert_eq!(
            commands(&menu),
            vec!["r10-a", "r10-b", "---", "r20", "unranked-1", "unranked-2"]
        );
    }

    #[test]
    fn test_children_is_snapshot() {
        let menu = Menu::new("File");
        menu.add_item(MenuItem::new("a"));
        let before = menu.children();

        menu.add_item(MenuItem::new("b").with_rank(1));
        assert_eq!(before.count(), 1);
        assert_eq!(commands(&menu), vec!["b", "a"]);
    }

    #[test]
    fn test_submenu_reinsert_updates_rank() {
        let root = Menu::new("Root");
        let sub = Menu::new("Sub");
        root.add_item(MenuItem::new("cmd").with_rank(50));
        root.add_submenu(sub.clone(), 80).unwrap();
        assert_eq!(commands(&root), vec!["cmd", "<Sub>"]);

        root.add_submenu(sub.clone(), 10).unwrap();
        assert_eq!(root.len(), 2);
        assert_eq!(commands(&root), vec!["<Sub>", "cmd"]);
    }

    #[test]
    fn test_submenu_mutation_after_attach_is_visible() {
        let root = Menu::new("Root");
        let sub = Menu::new("Sub");
        root.add_submenu(sub.clone(), None).unwrap();
        sub.add_item(MenuItem::new("late"));

        match root.children().next() {
            Some(MenuChild::Submenu { menu, .. }) => assert_eq!(menu.len(), 1),
            other => panic!("unexpected child: {:?}", other),
        }
    }

    #[test]
    fn test_cycles_rejected() {
        let a = Menu::new("A");
        let b = Menu::new("B");
        let c = Menu::new("C");
        a.add_submenu(b.clone(), None).unwrap();
        b.add_submenu(c.clone(), None).unwrap();

        assert!(matches!(
            c.add_submenu(a.clone(), None),
            Err(MenuError::Cycle { .. })
        ));
        assert!(matches!(
            a.add_submenu(a.clone(), None),
            Err(MenuError::Cycle { .. })
        ));
        assert!(a.contains_menu(c.id()));
        assert!(!c.contains_menu(a.id()));
    }

    #[test]
    fn test_remove_and_clear() {
        let menu = Menu::new("M");
        menu.add_item(MenuItem::new("x"));
        menu.add_item(MenuItem::new("y"));
        menu.add_item(MenuItem::new("x").with_rank(1));

        assert_eq!(menu.remove_command("x"), 2);
        assert_eq!(commands(&menu), vec!["y"]);
        menu.clear_items();
        assert!(menu.is_empty());
    }

    #[test]
    fn test_activate_delegates_to_registry() {
        let registry = CommandRegistry::new();
        let runs = Rc::new(Cell::new(0));
        {
            let runs = runs.clone();
            registry
                .add_command(
                    "count",
                    CommandOptions::new(move |args| {
                        runs.set(runs.get() + 1);
                        Ok(args.clone())
                    }),
                )
                .unwrap();
        }

        let menu = Menu::new("M");
        menu.add_item(MenuItem::new("count").with_args(json!({ "k": "v" })));
        menu.add_separator(None);
        menu.add_item(MenuItem::new("missing"));

        assert_eq!(
            menu.activate(0, &registry).unwrap(),
            Some(json!({ "k": "v" }))
        );
        assert_eq!(menu.activate(1, &registry).unwrap(), None);
        assert!(matches!(
            menu.activate(2, &registry),
            Err(MenuError::Command(CommandError::Unknown { .. }))
        ));
        assert!(matches!(
            menu.activate(3, &registry),
            Err(MenuError::NoEntry { index: 3, .. })
        ));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_item_label_resolution() {
        let registry = CommandRegistry::new();
        registry
            .add_command("labelled", CommandOptions::action(|_| Ok(())).label("Nice"))
            .unwrap();
        registry
            .add_command("bare", CommandOptions::action(|_| Ok(())))
            .unwrap();

        assert_eq!(MenuItem::new("labelled").label(&registry), "Nice");
        assert_eq!(MenuItem::new("bare").label(&registry), "bare");
        assert_eq!(MenuItem::new("ghost").label(&registry), "ghost");
        assert!(!MenuItem::new("ghost").is_enabled(&registry));
    }

    #[test]
    fn test_handler_may_mutate_menu() {
        let registry = CommandRegistry::new();
        let menu = Menu::new("M");
        {
            let menu = Rc::downgrade(&menu);
            registry
                .add_command(
                    "grow",
                    CommandOptions::action(move |_| {
                        let menu = menu
                            .upgrade()
                            .ok_or_else(|| anyhow::anyhow!("menu dropped"))?;
                        menu.add_item(MenuItem::new("grown"));
                        Ok(())
                    }),
                )
                .unwrap();
        }
        menu.add_item(MenuItem::new("grow"));

        menu.activate(0, &registry).unwrap();
        assert_eq!(commands(&menu), vec!["grow", "grown"]);
    }
}
