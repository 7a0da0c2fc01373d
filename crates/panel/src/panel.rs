//! Stacked panel implementation.

use std::any::Any;

use cmdpanel_core::{Title, Widget};
use cmdpanel_logger as logger;
use cmdpanel_signal::Signal;

/// Payload of [`Panel::widget_removed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRemoved {
    /// Position the widget occupied
    pub index: usize,
    /// Id of the removed widget
    pub id: String,
}

/// Container of child widgets stacked in insertion order.
///
/// Children are owned by the panel: they are disposed and dropped with
/// it, which also tears down any signal they expose.
pub struct Panel {
    id: String,
    title: Title,
    widgets: Vec<Box<dyn Widget>>,
    disposed: bool,
    widget_removed: Signal<Panel, WidgetRemoved>,
}

impl Panel {
    /// Create an empty panel. Title label defaults to empty, not closable.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Title::default(),
            widgets: Vec::new(),
            disposed: false,
            widget_removed: Signal::new(),
        }
    }

    /// Add widget at the end of the panel.
    pub fn add_widget(&mut self, widget: Box<dyn Widget>) {
        logger::debug(format!("Panel {}: adding widget {}", self.id, widget.id()));
        self.widgets.push(widget);
    }

    /// Insert widget at `index` (clamped to the number of children).
    pub fn insert_widget(&mut self, index: usize, widget: Box<dyn Widget>) {
        let index = index.min(self.widgets.len());
        self.widgets.insert(index, widget);
    }

    /// Remove widget by index, handing ownership back to the caller.
    pub fn take_widget(&mut self, index: usize) -> Option<Box<dyn Widget>> {
        if index >= self.widgets.len() {
            return None;
        }

        let widget = self.widgets.remove(index);
        self.widget_removed.emit(
            self,
            &WidgetRemoved {
                index,
                id: widget.id().to_string(),
            },
        );
        Some(widget)
    }

    /// Children in insertion order.
    pub fn widgets(&self) -> &[Box<dyn Widget>] {
        &self.widgets
    }

    /// Typed access to the child at `index`.
    pub fn widget<T: Widget>(&self, index: usize) -> Option<&T> {
        self.widgets.get(index)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to the child at `index`.
    pub fn widget_mut<T: Widget>(&mut self, index: usize) -> Option<&mut T> {
        self.widgets.get_mut(index)?.as_any_mut().downcast_mut::<T>()
    }

    /// First child of type `T`.
    pub fn find_widget<T: Widget>(&self) -> Option<&T> {
        self.widgets
            .iter()
            .find_map(|widget| widget.as_any().downcast_ref::<T>())
    }

    /// First child of type `T`, mutably.
    pub fn find_widget_mut<T: Widget>(&mut self) -> Option<&mut T> {
        self.widgets
            .iter_mut()
            .find_map(|widget| widget.as_any_mut().downcast_mut::<T>())
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Emitted after a child was taken out of the panel.
    pub fn widget_removed(&self) -> &Signal<Panel, WidgetRemoved> {
        &self.widget_removed
    }
}

impl Widget for Panel {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &Title {
        &self.title
    }

    fn title_mut(&mut self) -> &mut Title {
        &mut self.title
    }

    /// Dispose children in reverse order, then drop them.
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for widget in self.widgets.iter_mut().rev() {
            widget.dispose();
        }
        self.widgets.clear();
        self.widget_removed.disconnect_all();
        logger::debug(format!("Panel {} disposed", self.id));
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.dispose();
    }
}
