//! Menu composition.
//!
//! Menus are ranked trees of command references and submenus. Items only
//! name commands; resolution happens when an item is activated, through
//! [`cmdpanel_commands::CommandRegistry::execute`].

mod bar;
mod error;
mod menu;
mod render;

pub use bar::MenuBar;
pub use error::MenuError;
pub use menu::{create_menu, Children, Menu, MenuChild, MenuId, MenuItem};
pub use render::render_tree;

/// Stable ordering by rank: ranked entries ascending, then unranked ones,
/// insertion order among equals.
pub(crate) fn sort_by_rank<T>(entries: &mut [T], rank: impl Fn(&T) -> Option<i32>) {
    entries.sort_by_key(|entry| match rank(entry) {
        Some(rank) => (0, rank),
        None => (1, 0),
    });
}
