//! Command definitions.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Command handler: receives the invocation arguments, returns a JSON
/// result (`Value::Null` when there is nothing to return).
pub type Handler = Rc<dyn Fn(&Value) -> anyhow::Result<Value>>;

/// State predicate evaluated against invocation arguments.
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// Options used to register a command.
///
/// The handler is mandatory, everything else is optional metadata.
#[derive(Clone)]
pub struct CommandOptions {
    pub(crate) label: String,
    pub(crate) caption: String,
    pub(crate) usage: String,
    pub(crate) class_name: String,
    pub(crate) is_enabled: Option<Predicate>,
    pub(crate) is_visible: Option<Predicate>,
    pub(crate) is_toggled: Option<Predicate>,
    pub(crate) execute: Handler,
}

impl CommandOptions {
    /// Options with a handler returning a value.
    pub fn new<F>(execute: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + 'static,
    {
        Self {
            label: String::new(),
            caption: String::new(),
            usage: String::new(),
            class_name: String::new(),
            is_enabled: None,
            is_visible: None,
            is_toggled: None,
            execute: Rc::new(execute),
        }
    }

    /// Options with a handler run only for its side effects.
    pub fn action<F>(execute: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<()> + 'static,
    {
        Self::new(move |args| execute(args).map(|()| Value::Null))
    }

    /// Set label (builder).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set caption (builder).
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Set long-form usage text (builder).
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Set style class name (builder).
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Set enabled predicate (builder). Commands are enabled by default.
    pub fn enabled_when(mut self, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_enabled = Some(Rc::new(predicate));
        self
    }

    /// Set visibility predicate (builder). Commands are visible by default.
    pub fn visible_when(mut self, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_visible = Some(Rc::new(predicate));
        self
    }

    /// Set toggled predicate (builder). Commands are untoggled by default.
    pub fn toggled_when(mut self, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_toggled = Some(Rc::new(predicate));
        self
    }
}

/// A registered command.
pub struct Command {
    id: String,
    options: CommandOptions,
}

impl Command {
    pub(crate) fn new(id: String, options: CommandOptions) -> Self {
        Self { id, options }
    }

    /// Unique id within its registry.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.options.label
    }

    /// Tooltip text.
    pub fn caption(&self) -> &str {
        &self.options.caption
    }

    /// Usage text.
    pub fn usage(&self) -> &str {
        &self.options.usage
    }

    /// Style class name.
    pub fn class_name(&self) -> &str {
        &self.options.class_name
    }

    pub fn is_enabled(&self, args: &Value) -> bool {
        self.options.is_enabled.as_ref().map_or(true, |f| f(args))
    }

    pub fn is_visible(&self, args: &Value) -> bool {
        self.options.is_visible.as_ref().map_or(true, |f| f(args))
    }

    pub fn is_toggled(&self, args: &Value) -> bool {
        self.options.is_toggled.as_ref().map_or(false, |f| f(args))
    }

    pub(crate) fn handler(&self) -> Handler {
        Rc::clone(&self.options.execute)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("label", &self.options.label)
            .field("caption", &self.options.caption)
            .finish_non_exhaustive()
    }
}
