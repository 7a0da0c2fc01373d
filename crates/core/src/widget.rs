//! Widget capability trait.

use std::any::Any;

use crate::Title;

/// Capability set of anything a panel can own.
///
/// Widgets expose their title metadata and support downcasting so a
/// container can hand out typed access to the children it owns.
pub trait Widget: Any {
    /// Identifier used by the host (not required to be unique).
    fn id(&self) -> &str;

    /// Title metadata.
    fn title(&self) -> &Title;

    /// Mutable title metadata.
    fn title_mut(&mut self) -> &mut Title;

    /// Release resources held by the widget.
    ///
    /// Called by the owning container before the widget is dropped.
    fn dispose(&mut self) {}

    /// Whether [`Widget::dispose`] has run.
    fn is_disposed(&self) -> bool {
        false
    }

    /// Downcast to concrete type (immutable).
    fn as_any(&self) -> &dyn Any;

    /// Downcast to concrete type (mutable).
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
