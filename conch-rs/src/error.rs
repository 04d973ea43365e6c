//! Error types for registration, dispatch and console I/O.
//!
//! Errors fall into three classes:
//!
//! - **Registration** errors abort building a segment of the command tree.
//! - **Session** errors are reported to the operator by the root dispatch and
//!   the session continues.
//! - **Console** errors mean the operator can no longer be reached and end the
//!   session.

use std::io;

use thiserror::Error;

/// Result type used throughout the shell.
pub type ShellResult<T> = Result<T, ShellError>;

/// Top-level error type for the command tree.
#[derive(Debug, Error)]
pub enum ShellError {
    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------
    /// A name or alias collides with an existing sibling.
    #[error("Command name '{name}' is already registered in '{container}'")]
    DuplicateCommandName { name: String, container: String },

    /// A container can have at most one default child.
    #[error("Container '{container}' already has a default command, cannot add '{name}'")]
    DuplicateDefaultCommand { name: String, container: String },

    /// Names must be non-empty and addressable by the tokenizer.
    #[error("Invalid command name '{name}'")]
    InvalidCommandName { name: String },

    /// The child was built on, or registered through, another context.
    #[error("Command '{name}' belongs to another shell context than '{container}'")]
    ForeignContext { name: String, container: String },

    /// Registration attempted from inside a registration notification.
    #[error("Cannot register '{name}' while a registration notification is in progress")]
    ReentrantRegistration { name: String },

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------
    /// No child matched the first token at some container level.
    #[error("Unknown command '{token}'")]
    UnknownCommand {
        token: String,
        /// Names valid at the level where resolution stopped.
        available: Vec<String>,
    },

    /// The guard refused the invocation.
    #[error("Command '{command}' cannot be executed")]
    NotExecutable { command: String },

    /// Pre-supplied parameter text could not be converted.
    #[error("Invalid value '{text}' for parameter '{slot}' (expected {expected}): {reason}")]
    ParameterFormat {
        slot: String,
        text: String,
        expected: &'static str,
        reason: String,
    },

    /// The console signalled end of input while a parameter was being prompted.
    #[error("Input for '{slot}' was cancelled")]
    Cancelled { slot: String },

    /// A leaf command body failed.
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    // ------------------------------------------------------------------
    // Fatal
    // ------------------------------------------------------------------
    /// The console port failed.
    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),
}

impl ShellError {
    /// Whether this error is reported and then swallowed by the root dispatch.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            ShellError::UnknownCommand { .. }
                | ShellError::NotExecutable { .. }
                | ShellError::ParameterFormat { .. }
                | ShellError::Cancelled { .. }
                | ShellError::CommandFailed { .. }
        )
    }

    /// Whether this error was raised while building the tree.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            ShellError::DuplicateCommandName { .. }
                | ShellError::DuplicateDefaultCommand { .. }
                | ShellError::InvalidCommandName { .. }
                | ShellError::ForeignContext { .. }
                | ShellError::ReentrantRegistration { .. }
        )
    }

    /// Convenience constructor for leaf failures.
    pub fn failed(command: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ShellError::CommandFailed {
            command: command.into(),
            message: message.to_string(),
        }
    }
}

/// Errors raised by a [`Console`](crate::console::Console) implementation.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The console does not provide this primitive.
    #[error("Operation not supported by this console: {0}")]
    Unsupported(&'static str),
}
