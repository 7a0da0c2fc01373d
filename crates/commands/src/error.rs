//! Command registry errors.

use thiserror::Error;

/// Errors surfaced by [`crate::CommandRegistry`].
///
/// Registry-shape errors (`Duplicate`, `Unknown`) describe the caller's
/// request; `Execution` wraps whatever the handler returned.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A command with this id is already registered
    #[error("Command '{id}' is already registered")]
    Duplicate { id: String },

    /// No command with this id is registered
    #[error("Command '{id}' is not registered")]
    Unknown { id: String },

    /// The handler failed
    #[error("Command '{id}' failed: {source}")]
    Execution {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl CommandError {
    /// Id of the command the error refers to.
    pub fn command_id(&self) -> &str {
        match self {
            CommandError::Duplicate { id }
            | CommandError::Unknown { id }
            | CommandError::Execution { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_messages() {
        let dup = CommandError::Duplicate {
            id: "ex2:tutorial".to_string(),
        };
        assert_eq!(dup.to_string(), "Command 'ex2:tutorial' is already registered");
        assert_eq!(dup.command_id(), "ex2:tutorial");

        let unknown = CommandError::Unknown {
            id: "nope".to_string(),
        };
        assert_eq!(unknown.to_string(), "Command 'nope' is not registered");
    }

    #[test]
    fn test_execution_keeps_cause() {
        let err = CommandError::Execution {
            id: "x".to_string(),
            source: anyhow::anyhow!("disk full"),
        };
        assert!(err.to_string().contains("disk full"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".to_string()));
    }
}
