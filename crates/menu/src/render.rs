//! Plain-text outline of a menu bar.

use std::fmt::Write as _;

use cmdpanel_commands::CommandRegistry;

use crate::{Menu, MenuBar, MenuChild};

const INDENT: &str = "  ";

/// Render every menu of `bar` as an indented outline.
///
/// Items whose command is hidden are skipped. Disabled items are marked
/// `(disabled)`, toggled items are prefixed with `[x]`, and items naming
/// an unregistered command are marked `(missing)`.
pub fn render_tree(bar: &MenuBar, registry: &CommandRegistry) -> String {
    let mut out = String::new();
    for menu in bar.menus() {
        let _ = writeln!(out, "{}", menu.label());
        render_children(&menu, registry, 1, &mut out);
    }
    out
}

fn render_children(menu: &Menu, registry: &CommandRegistry, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    for child in menu.children() {
        match child {
            MenuChild::Command(item) => {
                if !registry.has(&item.command) {
                    let _ = writeln!(out, "{}{} (missing)", indent, item.command);
                    continue;
                }
                if !item.is_visible(registry) {
                    continue;
                }

                let check = if item.is_toggled(registry) { "[x] " } else { "" };
                let state = if item.is_enabled(registry) {
                    ""
                } else {
                    " (disabled)"
                };
                let _ = writeln!(out, "{}{}{}{}", indent, check, item.label(registry), state);
            }
            MenuChild::Submenu { menu, .. } => {
                let _ = writeln!(out, "{}{} >", indent, menu.label());
                render_children(&menu, registry, depth + 1, out);
            }
            MenuChild::Separator { .. } => {
                let _ = writeln!(out, "{}----", indent);
            }
        }
    }
}
