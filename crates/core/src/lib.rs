//! Core types and traits for cmdpanel widgets.
//!
//! A widget is anything that carries [`Title`] metadata and can be owned
//! by a container. Containers and menus build on these two pieces.

pub mod title;
pub mod widget;

pub use title::Title;
pub use widget::Widget;
