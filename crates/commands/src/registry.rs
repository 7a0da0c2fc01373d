//! Command registry.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cmdpanel_logger as logger;
use cmdpanel_signal::Signal;
use serde_json::Value;

use crate::{Command, CommandError, CommandOptions};

/// What happened to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The command was registered
    Added,
    /// The command's state (label, enabled, ...) should be re-read
    Changed,
}

/// Payload of [`CommandRegistry::command_changed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandChanged {
    pub id: String,
    pub kind: ChangeKind,
}

/// Payload of [`CommandRegistry::command_executed`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommandExecuted {
    pub id: String,
    pub args: Value,
    pub result: Value,
}

/// Owns every registered command and executes them by id.
///
/// Mutation goes through `&self` so handlers can re-enter the registry
/// (register or execute other commands) while they run. Commands are never
/// removed.
pub struct CommandRegistry {
    commands: RefCell<BTreeMap<String, Rc<Command>>>,
    command_changed: Signal<CommandRegistry, CommandChanged>,
    command_executed: Signal<CommandRegistry, CommandExecuted>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: RefCell::new(BTreeMap::new()),
            command_changed: Signal::new(),
            command_executed: Signal::new(),
        }
    }

    /// Register a command.
    ///
    /// Fails with [`CommandError::Duplicate`] if the id is taken; the
    /// existing command stays registered.
    pub fn add_command(
        &self,
        id: impl Into<String>,
        options: CommandOptions,
    ) -> Result<(), CommandError> {
        let id = id.into();
        {
            let mut commands = self.commands.borrow_mut();
            if commands.contains_key(&id) {
                logger::warn(format!("Duplicate command registration: {}", id));
                return Err(CommandError::Duplicate { id });
            }
            commands.insert(id.clone(), Rc::new(Command::new(id.clone(), options)));
        }

        logger::debug(format!("Command registered: {}", id));
        self.command_changed.emit(
            self,
            &CommandChanged {
                id,
                kind: ChangeKind::Added,
            },
        );
        Ok(())
    }

    /// Run the handler of `id` with `args` and return its result.
    ///
    /// Handler failures come back as [`CommandError::Execution`] with the
    /// handler's error as source.
    pub fn execute(&self, id: &str, args: &Value) -> Result<Value, CommandError> {
        let handler = self
            .command(id)
            .ok_or_else(|| CommandError::Unknown { id: id.to_string() })?
            .handler();

        logger::debug(format!("Executing command: {}", id));
        match handler(args) {
            Ok(result) => {
                self.command_executed.emit(
                    self,
                    &CommandExecuted {
                        id: id.to_string(),
                        args: args.clone(),
                        result: result.clone(),
                    },
                );
                Ok(result)
            }
            Err(source) => {
                logger::warn(format!("Command {} failed: {:#}", id, source));
                Err(CommandError::Execution {
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Whether `id` is registered.
    pub fn has(&self, id: &str) -> bool {
        self.commands.borrow().contains_key(id)
    }

    /// Look up a registered command.
    pub fn command(&self, id: &str) -> Option<Rc<Command>> {
        self.commands.borrow().get(id).cloned()
    }

    /// Registered ids in sorted order.
    pub fn list_commands(&self) -> Vec<String> {
        self.commands.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    /// Label of `id`, or None if unknown.
    pub fn label(&self, id: &str) -> Option<String> {
        self.command(id).map(|c| c.label().to_string())
    }

    /// Caption of `id`, or None if unknown.
    pub fn caption(&self, id: &str) -> Option<String> {
        self.command(id).map(|c| c.caption().to_string())
    }

    /// Usage text of `id`, or None if unknown.
    pub fn usage(&self, id: &str) -> Option<String> {
        self.command(id).map(|c| c.usage().to_string())
    }

    /// False for unknown ids.
    pub fn is_enabled(&self, id: &str, args: &Value) -> bool {
        self.command(id).is_some_and(|c| c.is_enabled(args))
    }

    /// False for unknown ids.
    pub fn is_visible(&self, id: &str, args: &Value) -> bool {
        self.command(id).is_some_and(|c| c.is_visible(args))
    }

    /// False for unknown ids.
    pub fn is_toggled(&self, id: &str, args: &Value) -> bool {
        self.command(id).is_some_and(|c| c.is_toggled(args))
    }

    /// Tell observers that the state of `id` changed.
    pub fn notify_command_changed(&self, id: &str) -> Result<(), CommandError> {
        if !self.has(id) {
            return Err(CommandError::Unknown { id: id.to_string() });
        }
        self.command_changed.emit(
            self,
            &CommandChanged {
                id: id.to_string(),
                kind: ChangeKind::Changed,
            },
        );
        Ok(())
    }

    /// Emitted after registration and on [`Self::notify_command_changed`].
    pub fn command_changed(&self) -> &Signal<CommandRegistry, CommandChanged> {
        &self.command_changed
    }

    /// Emitted after every successful execution.
    pub fn command_executed(&self) -> &Signal<CommandRegistry, CommandExecuted> {
        &self.command_executed
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
