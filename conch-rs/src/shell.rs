//! The root of a command tree and the session loop around it.

use std::sync::Arc;

use crate::command::{suggestions, Command, ContainerCommand};
use crate::config::ShellConfig;
use crate::console::{Console, OutputLevel, TerminalConsole};
use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};

/// Primary name of the root container.
pub const ROOT_NAME: &str = "root";

/// An interactive shell: a root container, its context and configuration.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use conch::{Shell, ShellConfig};
/// use conch::console::MemoryConsole;
///
/// # #[tokio::main]
/// # async fn main() {
/// let console = Arc::new(MemoryConsole::with_input(["help", "exit"]));
/// let shell = Shell::with_config(console.clone(), ShellConfig::default()).unwrap();
///
/// shell.run().await.unwrap();
/// assert!(console.contains("exec ..."));
/// # }
/// ```
pub struct Shell {
    context: ShellContext,
    root: ContainerCommand,
    config: ShellConfig,
}

impl Shell {
    /// Create a shell with the default configuration.
    pub fn new(console: Arc<dyn Console>) -> ShellResult<Self> {
        Self::with_config(console, ShellConfig::default())
    }

    /// Create a shell, registering the built-in commands if configured.
    pub fn with_config(console: Arc<dyn Console>, config: ShellConfig) -> ShellResult<Self> {
        let context = ShellContext::new(console);
        let root = ContainerCommand::root(&context, ROOT_NAME, "Interactive shell");
        let mut shell = Self {
            context,
            root,
            config,
        };

        if shell.config.builtins {
            shell.install_builtins()?;
        }
        Ok(shell)
    }

    /// Create a shell on the process terminal.
    ///
    /// `config.color = false` turns styling off even when stdout is a terminal.
    pub fn terminal(config: ShellConfig) -> ShellResult<Self> {
        let mut console = TerminalConsole::new();
        if !config.color {
            console = console.with_color(false);
        }
        Self::with_config(Arc::new(console), config)
    }

    #[cfg(feature = "builtins")]
    fn install_builtins(&mut self) -> ShellResult<()> {
        crate::builtins::register_builtins(&mut self.root)
    }

    #[cfg(not(feature = "builtins"))]
    fn install_builtins(&mut self) -> ShellResult<()> {
        tracing::debug!("Built-in commands are not compiled in");
        Ok(())
    }

    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    pub fn root(&self) -> &ContainerCommand {
        &self.root
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Attach a top-level command.
    pub fn register(&mut self, command: impl Into<Command>) -> ShellResult<()> {
        self.root.register(command)
    }

    /// Resolve and run one line.
    ///
    /// The root itself is not gated, so an empty tree or one whose commands
    /// are all disabled still reports unknown tokens. Every command below the
    /// root goes through its guard.
    ///
    /// Unknown commands, guard refusals, parameter errors, cancelled prompts
    /// and failed commands are written to the console and the result is
    /// `Ok(true)`. Only console failures are returned as errors. `Ok(false)`
    /// means a command asked to end the session.
    pub async fn dispatch(&self, line: &str) -> ShellResult<bool> {
        tracing::debug!(line = %line, "Dispatching");
        match self.root.resolve(line).await {
            Ok(keep_going) => Ok(keep_going),
            Err(err) if err.is_session_error() => {
                tracing::debug!(error = %err, "Command not handled");
                self.report(&err);
                Ok(true)
            }
            Err(err) => {
                tracing::error!(error = %err, "Dispatch failed");
                Err(err)
            }
        }
    }

    /// Run the read loop until input ends or a command ends the session.
    ///
    /// Lines queued with [`ShellContext::inject_lines`] run before the
    /// console is read again. Blank lines are skipped. When a command ends
    /// the session, lines still queued are dropped.
    pub async fn run(&self) -> ShellResult<()> {
        tracing::info!("Session started");
        loop {
            let line = match self.context.next_pending_line() {
                Some(line) => line,
                None => match self.context.console().read_line(&self.config.prompt).await? {
                    Some(line) => line,
                    None => break,
                },
            };

            if line.trim().is_empty() {
                continue;
            }
            if !self.dispatch(&line).await? {
                self.context.clear_pending();
                break;
            }
        }
        tracing::info!("Session ended");
        Ok(())
    }

    fn report(&self, err: &ShellError) {
        match err {
            ShellError::UnknownCommand { token, available } => {
                let message = if token.is_empty() {
                    "No command given.".to_string()
                } else {
                    err.to_string()
                };
                self.context.write(&message, OutputLevel::Error);

                if self.config.suggest_on_unknown && !available.is_empty() {
                    let names = suggestions(available, token);
                    self.context
                        .write(&format!("Available: {}", names.join(", ")), OutputLevel::Help);
                }
            }
            ShellError::Cancelled { .. } => {
                self.context.write(&err.to_string(), OutputLevel::Warning);
            }
            _ => self.context.write(&err.to_string(), OutputLevel::Error),
        }
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}
