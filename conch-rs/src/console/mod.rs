//! The console port.
//!
//! The command tree never talks to a terminal directly. Everything it prints
//! or asks for goes through the [`Console`] trait, so a host can plug in its
//! own renderer, line editor or test double.

mod memory;
mod terminal;

pub use memory::{MemoryConsole, OutputLine};
pub use terminal::TerminalConsole;

use anstyle::{AnsiColor, Style};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

// ============================================================================
// Output Levels
// ============================================================================

/// Severity tag attached to every line written to the console.
///
/// The level only affects presentation. It never changes control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLevel {
    /// Plain command output.
    #[default]
    Default,
    /// Informational message.
    Information,
    /// Something the operator should look at.
    Warning,
    /// A failed command.
    Error,
    /// Asynchronous notification (e.g. a background task finished).
    Event,
    /// Help text.
    Help,
}

impl OutputLevel {
    /// Terminal style used to render this level.
    pub fn style(self) -> Style {
        match self {
            OutputLevel::Default => Style::new(),
            OutputLevel::Information => AnsiColor::Green.on_default(),
            OutputLevel::Warning => AnsiColor::Yellow.on_default(),
            OutputLevel::Error => AnsiColor::Red.on_default().bold(),
            OutputLevel::Event => AnsiColor::Cyan.on_default(),
            OutputLevel::Help => AnsiColor::BrightBlack.on_default(),
        }
    }

    /// Whether a terminal should route this level to stderr.
    pub fn is_diagnostic(self) -> bool {
        matches!(self, OutputLevel::Warning | OutputLevel::Error)
    }
}

// ============================================================================
// Key Events
// ============================================================================

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    /// The same key with Ctrl held.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

// ============================================================================
// Console Trait
// ============================================================================

/// Capability interface between the command tree and the operator.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use conch::console::{Console, OutputLevel};
/// use conch::ConsoleError;
///
/// struct Silent;
///
/// #[async_trait]
/// impl Console for Silent {
///     fn write(&self, _text: &str, _level: OutputLevel) {}
///
///     async fn read_line(&self, _prompt: &str) -> Result<Option<String>, ConsoleError> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait Console: Send + Sync {
    /// Emit one line of output.
    fn write(&self, text: &str, level: OutputLevel);

    /// Read one full line from the operator, showing `prompt` first.
    ///
    /// Returns `Ok(None)` when input has ended or the operator cancelled.
    async fn read_line(&self, prompt: &str) -> Result<Option<String>, ConsoleError>;

    /// Read a single key press.
    ///
    /// Only line editors and similar collaborators need this; the dispatch
    /// core never calls it.
    async fn read_key(&self) -> Result<KeyEvent, ConsoleError> {
        Err(ConsoleError::Unsupported("read_key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_unstyled() {
        assert_eq!(OutputLevel::Default.style(), Style::new());
        assert_ne!(OutputLevel::Error.style(), Style::new());
    }

    #[test]
    fn test_diagnostic_levels() {
        assert!(OutputLevel::Warning.is_diagnostic());
        assert!(OutputLevel::Error.is_diagnostic());
        assert!(!OutputLevel::Information.is_diagnostic());
        assert!(!OutputLevel::Help.is_diagnostic());
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&OutputLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[tokio::test]
    async fn test_read_key_defaults_to_unsupported() {
        struct LinesOnly;

        #[async_trait]
        impl Console for LinesOnly {
            fn write(&self, _text: &str, _level: OutputLevel) {}

            async fn read_line(&self, _prompt: &str) -> Result<Option<String>, ConsoleError> {
                Ok(None)
            }
        }

        let result = LinesOnly.read_key().await;
        assert!(matches!(result, Err(ConsoleError::Unsupported("read_key"))));
    }
}
