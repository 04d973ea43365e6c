//! Standard input/output console.

use std::io::{self, IsTerminal, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use super::{Console, OutputLevel};
use crate::error::ConsoleError;

/// Console backed by the process's stdin and stdout.
///
/// Warnings and errors go to stderr. Output is colored when stdout is a
/// terminal, unless disabled with [`TerminalConsole::with_color`].
pub struct TerminalConsole {
    stdin: Mutex<BufReader<Stdin>>,
    color: bool,
}

impl TerminalConsole {
    /// Create a console on the process's standard streams.
    pub fn new() -> Self {
        Self {
            stdin: Mutex::new(BufReader::new(tokio::io::stdin())),
            color: io::stdout().is_terminal(),
        }
    }

    /// Force colored output on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn render(&self, text: &str, level: OutputLevel) -> String {
        if !self.color {
            return text.to_string();
        }
        let style = level.style();
        format!("{}{}{}", style.render(), text, style.render_reset())
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for TerminalConsole {
    fn write(&self, text: &str, level: OutputLevel) {
        let rendered = self.render(text, level);
        // Presentation only; a broken pipe here must not abort the command.
        if level.is_diagnostic() {
            let _ = writeln!(io::stderr().lock(), "{}", rendered);
        } else {
            let _ = writeln!(io::stdout().lock(), "{}", rendered);
        }
    }

    async fn read_line(&self, prompt: &str) -> Result<Option<String>, ConsoleError> {
        {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
        }

        let mut line = String::new();
        let read = self.stdin.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
