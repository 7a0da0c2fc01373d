//! Top-level menu bar.

use std::cell::RefCell;
use std::rc::Rc;

use cmdpanel_logger as logger;

use crate::{sort_by_rank, Menu, MenuId};

struct Entry {
    menu: Rc<Menu>,
    rank: Option<i32>,
}

/// Root registry of top-level menus, ordered by rank.
#[derive(Default)]
pub struct MenuBar {
    menus: RefCell<Vec<Entry>>,
}

impl MenuBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a top-level menu.
    ///
    /// Re-adding a menu that is already attached only replaces its rank.
    pub fn add_menu(&self, menu: Rc<Menu>, rank: impl Into<Option<i32>>) {
        let rank = rank.into();
        logger::debug(format!("Menu bar: '{}' (rank {:?})", menu.label(), rank));

        let mut menus = self.menus.borrow_mut();
        let existing = menus
            .iter_mut()
            .find(|entry| entry.menu.id() == menu.id());
        match existing {
            Some(entry) => entry.rank = rank,
            None => menus.push(Entry { menu, rank }),
        }
    }

    /// Detach a menu. Returns false if it was not attached.
    pub fn remove_menu(&self, id: MenuId) -> bool {
        let mut menus = self.menus.borrow_mut();
        let before = menus.len();
        menus.retain(|entry| entry.menu.id() != id);
        menus.len() != before
    }

    /// Top-level menus ordered by rank.
    pub fn menus(&self) -> Vec<Rc<Menu>> {
        let mut ranked: Vec<(Rc<Menu>, Option<i32>)> = self
            .menus
            .borrow()
            .iter()
            .map(|entry| (Rc::clone(&entry.menu), entry.rank))
            .collect();
        sort_by_rank(&mut ranked, |entry| entry.1);
        ranked.into_iter().map(|(menu, _)| menu).collect()
    }

    /// Rank a menu was attached with.
    pub fn rank_of(&self, id: MenuId) -> Option<i32> {
        self.menus
            .borrow()
            .iter()
            .find(|entry| entry.menu.id() == id)
            .and_then(|entry| entry.rank)
    }

    /// First top-level menu whose title label equals `label`.
    pub fn find_menu(&self, label: &str) -> Option<Rc<Menu>> {
        self.menus().into_iter().find(|menu| menu.label() == label)
    }

    pub fn len(&self) -> usize {
        self.menus.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.borrow().is_empty()
    }
}
