//! Panel composition.
//!
//! A [`Panel`] owns its child widgets exclusively and is itself a
//! [`cmdpanel_core::Widget`], so panels nest into trees.

mod panel;

pub use panel::{Panel, WidgetRemoved};
