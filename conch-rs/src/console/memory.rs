//! In-memory console with scripted input and recorded output.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Console, KeyEvent, OutputLevel};
use crate::error::ConsoleError;

/// One line written to a [`MemoryConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub level: OutputLevel,
    pub text: String,
}

/// Console that answers from a script and records everything written.
///
/// Useful for tests and for hosts that drive the shell programmatically.
/// `read_line` returns `None` once the scripted lines run out.
///
/// # Example
///
/// ```
/// use conch::console::{Console, MemoryConsole, OutputLevel};
///
/// let console = MemoryConsole::with_input(["exec sleep 5"]);
/// console.write("ready", OutputLevel::Information);
/// assert_eq!(console.lines_at(OutputLevel::Information), vec!["ready"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryConsole {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    input: VecDeque<String>,
    keys: VecDeque<KeyEvent>,
    output: Vec<OutputLine>,
    prompts: Vec<String>,
}

impl MemoryConsole {
    /// Create a console with no scripted input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console that answers `read_line` with `lines`, in order.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::new();
        for line in lines {
            console.push_line(line);
        }
        console
    }

    /// Append a line to the input script.
    pub fn push_line(&self, line: impl Into<String>) {
        self.inner.lock().input.push_back(line.into());
    }

    /// Append a key press to the key script.
    pub fn push_key(&self, key: KeyEvent) {
        self.inner.lock().keys.push_back(key);
    }

    /// Everything written so far.
    pub fn output(&self) -> Vec<OutputLine> {
        self.inner.lock().output.clone()
    }

    /// Text of the lines written at `level`.
    pub fn lines_at(&self, level: OutputLevel) -> Vec<String> {
        self.inner
            .lock()
            .output
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.text.clone())
            .collect()
    }

    /// Whether any written line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.inner
            .lock()
            .output
            .iter()
            .any(|line| line.text.contains(needle))
    }

    /// Prompts shown by `read_line`, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.inner.lock().prompts.clone()
    }

    /// Scripted lines not yet consumed.
    pub fn remaining_input(&self) -> usize {
        self.inner.lock().input.len()
    }

    /// Forget recorded output and prompts.
    pub fn clear_output(&self) {
        let mut inner = self.inner.lock();
        inner.output.clear();
        inner.prompts.clear();
    }
}

#[async_trait]
impl Console for MemoryConsole {
    fn write(&self, text: &str, level: OutputLevel) {
        self.inner.lock().output.push(OutputLine {
            level,
            text: text.to_string(),
        });
    }

    async fn read_line(&self, prompt: &str) -> Result<Option<String>, ConsoleError> {
        let mut inner = self.inner.lock();
        inner.prompts.push(prompt.to_string());
        Ok(inner.input.pop_front())
    }

    async fn read_key(&self) -> Result<KeyEvent, ConsoleError> {
        self.inner.lock().keys.pop_front().ok_or_else(|| {
            ConsoleError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no scripted key left",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Key;

    #[tokio::test]
    async fn test_read_line_follows_script() {
        let console = MemoryConsole::with_input(["first", "second"]);

        assert_eq!(console.read_line("> ").await.unwrap().as_deref(), Some("first"));
        assert_eq!(console.read_line("> ").await.unwrap().as_deref(), Some("second"));
        assert_eq!(console.read_line("> ").await.unwrap(), None);
        assert_eq!(console.prompts(), vec!["> ", "> ", "> "]);
    }

    #[tokio::test]
    async fn test_read_key_follows_script() {
        let console = MemoryConsole::new();
        console.push_key(KeyEvent::plain(Key::Char('q')));

        let key = console.read_key().await.unwrap();
        assert_eq!(key.key, Key::Char('q'));
        assert!(console.read_key().await.is_err());
    }

    #[test]
    fn test_output_is_recorded_per_level() {
        let console = MemoryConsole::new();
        console.write("done", OutputLevel::Default);
        console.write("careful", OutputLevel::Warning);

        assert_eq!(console.output().len(), 2);
        assert_eq!(console.lines_at(OutputLevel::Warning), vec!["careful"]);
        assert!(console.contains("don"));

        console.clear_output();
        assert!(console.output().is_empty());
    }
}
