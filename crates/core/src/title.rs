//! Title metadata shared by widgets and menus.

/// Display metadata of a widget or menu.
///
/// Plain fields; any component may read or write them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Title {
    /// Text shown in tabs, headers and menu bars
    pub label: String,
    /// Tooltip text
    pub caption: String,
    /// Extra style class for the host renderer
    pub class_name: String,
    /// Whether the host offers a close button
    pub closable: bool,
}

impl Title {
    /// Create a title with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set closable flag (builder).
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    /// Set caption (builder).
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}
